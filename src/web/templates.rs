//! HTML templates, compiled into the binary

use minijinja::Environment;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("admin_home.html", include_str!("../../templates/admin_home.html")),
    ("lend_device.html", include_str!("../../templates/lend_device.html")),
    ("lend.html", include_str!("../../templates/lend.html")),
    ("admin_equipment_list.html", include_str!("../../templates/admin_equipment_list.html")),
    ("admin_equipment_new.html", include_str!("../../templates/admin_equipment_new.html")),
    ("admin_equipment_edit.html", include_str!("../../templates/admin_equipment_edit.html")),
    ("track_index.html", include_str!("../../templates/track_index.html")),
    ("history.html", include_str!("../../templates/history.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("admin_users.html", include_str!("../../templates/admin_users.html")),
];

/// Build the template environment used by every page
pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    for &(name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}

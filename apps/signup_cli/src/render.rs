use signup_core::FormView;

pub fn render_view(view: &FormView) -> String {
    let visibility = if view.password_visible { "shown" } else { "hidden" };
    let button = if view.submit_enabled {
        format!("[ {} ]", view.submit_label)
    } else {
        format!("[ {} ] (disabled)", view.submit_label)
    };

    let mut out = format!(
        "Login\n  name:     {}\n  email:    {}\n  password: {} ({visibility})\n  {button}",
        view.name, view.email, view.password_display
    );
    if let Some(status) = &view.status_message {
        out.push_str("\n  ");
        out.push_str(status);
    }
    out
}

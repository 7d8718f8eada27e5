use tera::{Context, Tera};

/// Page templates, compiled once at startup. Sources are embedded so the
/// binary does not depend on its working directory.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("macros.html", include_str!("../templates/macros.html")),
            ("home.html", include_str!("../templates/home.html")),
            ("home-anon.html", include_str!("../templates/home-anon.html")),
            ("users/signup.html", include_str!("../templates/users/signup.html")),
            ("users/login.html", include_str!("../templates/users/login.html")),
            ("users/index.html", include_str!("../templates/users/index.html")),
            ("users/detail.html", include_str!("../templates/users/detail.html")),
            ("users/show.html", include_str!("../templates/users/show.html")),
            ("users/connections.html", include_str!("../templates/users/connections.html")),
            ("users/likes.html", include_str!("../templates/users/likes.html")),
            ("users/edit.html", include_str!("../templates/users/edit.html")),
            ("messages/new.html", include_str!("../templates/messages/new.html")),
            ("messages/show.html", include_str!("../templates/messages/show.html")),
        ])?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, ctx: &Context) -> Result<String, tera::Error> {
        self.tera.render(name, ctx)
    }
}

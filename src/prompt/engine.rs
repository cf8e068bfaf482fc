use tera::Tera;

/// Tera-backed template engine for building structured prompts.
///
/// Templates are registered inline; nothing is read from the filesystem, so
/// rendering stays deterministic across machines.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    pub fn new() -> anyhow::Result<Self> {
        let tera = Tera::default();
        Ok(Self { tera })
    }

    /// Register a template from a string, replacing any previous template
    /// with the same name.
    pub fn add_template(&mut self, name: &str, content: &str) -> anyhow::Result<()> {
        self.tera.add_raw_template(name, content)?;
        Ok(())
    }

    /// Render a named template with the given context.
    pub fn render(&self, template_name: &str, context: &tera::Context) -> anyhow::Result<String> {
        let rendered = self.tera.render(template_name, context)?;
        Ok(rendered)
    }
}

//! # Source Generation
//!
//! Renders the boilerplate files of a module from Liquid templates.
//!
//! | Artifact | Location | Template |
//! |----------|----------|----------|
//! | Module interface header | `Source/<Module>/Public/<Module>.h` | `header` |
//! | Build rules | `Source/<Module>/<Module>.Build.cs` | `build_file` |
//!
//! Both templates share the `copyright` partial. All templates are compiled
//! once by [`Templates::new`]; a template that fails to compile is a startup
//! error, never a per-file one.

mod templates;

use liquid::partials::{EagerCompiler, InMemorySource};
use serde::Serialize;
use thiserror::Error;

pub use templates::DEFAULT_COPYRIGHT;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to compile template '{name}': {message}")]
    Compile { name: &'static str, message: String },

    #[error("Failed to render template '{name}': {message}")]
    Render { name: &'static str, message: String },
}

/// Inputs for the module interface header
#[derive(Debug, Clone, Default)]
pub struct HeaderContext {
    pub copyright: String,
    pub module_name: String,
    pub is_game_module: bool,
}

/// Inputs for the module build rules
#[derive(Debug, Clone, Default)]
pub struct BuildFileContext {
    pub copyright: String,
    pub module_name: String,
    pub public_dependencies: Vec<String>,
    pub private_dependencies: Vec<String>,
}

#[derive(Serialize)]
struct HeaderView<'a> {
    copyright: &'a str,
    module_name: &'a str,
    is_game_module: bool,
}

#[derive(Serialize)]
struct BuildFileView<'a> {
    copyright: &'a str,
    module_name: &'a str,
    public_dependencies: &'a [String],
    private_dependencies: &'a [String],
    has_public_dependencies: bool,
    has_private_dependencies: bool,
}

fn copyright_or_default(text: &str) -> &str {
    if text.is_empty() {
        DEFAULT_COPYRIGHT
    } else {
        text
    }
}

/// Compiled templates
pub struct Templates {
    header: liquid::Template,
    build_file: liquid::Template,
}

impl Templates {
    /// Compiles all templates
    pub fn new() -> Result<Self, RenderError> {
        let mut partials = InMemorySource::new();
        partials.add("copyright", templates::COPYRIGHT);

        let parser = liquid::ParserBuilder::with_stdlib()
            .partials(EagerCompiler::new(partials))
            .build()
            .map_err(|e| RenderError::Compile {
                name: "copyright",
                message: e.to_string(),
            })?;

        let compile = |name: &'static str, source: &str| {
            parser.parse(source).map_err(|e| RenderError::Compile {
                name,
                message: e.to_string(),
            })
        };

        Ok(Self {
            header: compile("header", templates::HEADER)?,
            build_file: compile("build_file", templates::BUILD_FILE)?,
        })
    }

    /// Renders `<Module>.h`
    pub fn render_header(&self, ctx: &HeaderContext) -> Result<String, RenderError> {
        let view = HeaderView {
            copyright: copyright_or_default(&ctx.copyright),
            module_name: &ctx.module_name,
            is_game_module: ctx.is_game_module,
        };
        render("header", &self.header, &view)
    }

    /// Renders `<Module>.Build.cs`
    pub fn render_build_file(&self, ctx: &BuildFileContext) -> Result<String, RenderError> {
        let view = BuildFileView {
            copyright: copyright_or_default(&ctx.copyright),
            module_name: &ctx.module_name,
            public_dependencies: &ctx.public_dependencies,
            private_dependencies: &ctx.private_dependencies,
            has_public_dependencies: !ctx.public_dependencies.is_empty(),
            has_private_dependencies: !ctx.private_dependencies.is_empty(),
        };
        render("build_file", &self.build_file, &view)
    }
}

fn render<T: Serialize>(
    name: &'static str,
    template: &liquid::Template,
    view: &T,
) -> Result<String, RenderError> {
    let to_render_error = |e: liquid::Error| RenderError::Render {
        name,
        message: e.to_string(),
    };
    let globals = liquid::to_object(view).map_err(to_render_error)?;
    template.render(&globals).map_err(to_render_error)
}

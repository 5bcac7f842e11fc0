//! Shader bodies, the built-in catalog, and the fixed GLSL around them.
//!
//! A body is a ShaderToy-style fragment: it defines
//! `void mainImage(out vec4 fragColor, in vec2 fragCoord)` and may read the
//! four uniforms declared by [`FRAGMENT_PREAMBLE`]. The entry point is checked
//! when the body is registered so a broken catalog fails before the first
//! frame rather than on a button press.

use std::ops::Index;

use crate::error::CatalogError;

pub const RESOLUTION_UNIFORM: &str = "iResolution";
pub const MOUSE_UNIFORM: &str = "iMouse";
pub const TIME_UNIFORM: &str = "iTime";
pub const PALETTE_UNIFORM: &str = "iPalette";

/// Attribute slot the full-screen geometry is bound to.
pub const POSITION_ATTRIBUTE: u32 = 0;

/// Passes clip-space positions straight through; shared by every program.
pub const VERTEX_SHADER: &str = r"#version 300 es
layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Uniform contract injected ahead of every body.
pub const FRAGMENT_PREAMBLE: &str = r"#version 300 es
precision highp float;

uniform vec3 iResolution;
uniform vec2 iMouse;
uniform float iTime;
uniform vec3 iPalette[8];

out vec4 outColor;
";

/// Entry point appended after every body.
pub const FRAGMENT_MAIN: &str = r"
void main() {
    mainImage(outColor, gl_FragCoord.xy);
}
";

const CONTRACT_UNIFORMS: [&str; 4] = [
    RESOLUTION_UNIFORM,
    MOUSE_UNIFORM,
    TIME_UNIFORM,
    PALETTE_UNIFORM,
];

/// A fragment body that is known to declare `mainImage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBody {
    name: String,
    source: String,
}

impl ShaderBody {
    /// Validates the entry point and strips anything the preamble already
    /// provides (`#version`, redeclared contract uniforms).
    pub fn new(name: impl Into<String>, source: impl AsRef<str>) -> Result<Self, CatalogError> {
        let name = name.into();
        let source = sanitize(source.as_ref());
        if !declares_main_image(&source) {
            return Err(CatalogError::MissingEntryPoint(name));
        }
        Ok(Self { name, source })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Complete fragment stage: preamble, body, then `main`.
    ///
    /// `#line 1` keeps compiler diagnostics pointing at body lines.
    pub fn fragment_source(&self) -> String {
        format!(
            "{FRAGMENT_PREAMBLE}#line 1\n{body}{FRAGMENT_MAIN}",
            body = self.source
        )
    }
}

fn sanitize(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 1);
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#version") {
            continue;
        }
        if declared_uniform(trimmed).is_some_and(|name| CONTRACT_UNIFORMS.contains(&name)) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Name declared by a `uniform` line, without any array suffix.
fn declared_uniform(line: &str) -> Option<&str> {
    let declaration = line.strip_prefix("uniform ")?;
    let declaration = declaration.split(';').next()?;
    let declaration = declaration.split('[').next()?;
    declaration.split_whitespace().last()
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (c, next) {
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn declares_main_image(source: &str) -> bool {
    const ENTRY: &str = "mainImage";
    let code = strip_comments(source);
    let mut offset = 0;
    while let Some(found) = code[offset..].find(ENTRY) {
        let start = offset + found;
        let end = start + ENTRY.len();
        offset = end;

        let before = code[..start].trim_end();
        let returns_void = before
            .strip_suffix("void")
            .is_some_and(|head| !head.ends_with(is_ident));
        if !returns_void || code[end..].starts_with(is_ident) {
            continue;
        }
        let Some(args) = code[end..].trim_start().strip_prefix('(') else {
            continue;
        };
        let Some(close) = args.find(')') else {
            continue;
        };
        let params: Vec<Vec<&str>> = args[..close]
            .split(',')
            .map(|param| param.split_whitespace().collect())
            .collect();
        if let [color, coord] = params.as_slice() {
            let color_ok =
                color.contains(&"vec4") && (color.contains(&"out") || color.contains(&"inout"));
            let coord_ok = coord.contains(&"vec2") && !coord.contains(&"out");
            if color_ok && coord_ok {
                return true;
            }
        }
    }
    false
}

/// Ordered, non-empty list of shader bodies, indexed cyclically by the
/// selector.
#[derive(Debug, Clone)]
pub struct Catalog {
    bodies: Vec<ShaderBody>,
}

impl Catalog {
    pub fn new(bodies: Vec<ShaderBody>) -> Result<Self, CatalogError> {
        if bodies.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { bodies })
    }

    /// Shaders shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        let bodies = [
            ("rotating squares", include_str!("../shaders/rotating_squares.glsl")),
            ("fractal circles", include_str!("../shaders/fractal_circles.glsl")),
            ("hearts", include_str!("../shaders/hearts.glsl")),
            ("palette rings", include_str!("../shaders/palette_rings.glsl")),
            ("palette waves", include_str!("../shaders/palette_waves.glsl")),
        ]
        .into_iter()
        .map(|(name, source)| ShaderBody::new(name, source))
        .collect::<Result<Vec<_>, _>>()?;
        Self::new(bodies)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Never true for a catalog built through [`Catalog::new`].
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ShaderBody> {
        self.bodies.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShaderBody> {
        self.bodies.iter()
    }
}

impl Index<usize> for Catalog {
    type Output = ShaderBody;

    fn index(&self, index: usize) -> &ShaderBody {
        &self.bodies[index]
    }
}

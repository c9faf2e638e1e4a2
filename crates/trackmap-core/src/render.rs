use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::RenderError;
use crate::model::{RunParameters, TrackSequence};

const TRACK_MAP_TEMPLATE: &str = include_str!("templates/track_map.html");

pub const DEFAULT_STARTUP_DELAY_MS: u32 = 2_000;
pub const DEFAULT_ZOOM: u8 = 12;

/// Viewer settings that are not part of a run's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub startup_delay_ms: u32,
    pub zoom: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Renders the document with default options and writes it to `output_path`.
pub fn render_artifact(
    sequence: &TrackSequence,
    params: &RunParameters,
    output_path: &Path,
) -> Result<(), RenderError> {
    render_artifact_with(sequence, params, &RenderOptions::default(), output_path)
}

/// Renders the document and atomically replaces `output_path` with it.
///
/// The text is written to a temporary file in the destination directory first, so a failure
/// never leaves a partial document behind.
pub fn render_artifact_with(
    sequence: &TrackSequence,
    params: &RunParameters,
    options: &RenderOptions,
    output_path: &Path,
) -> Result<(), RenderError> {
    let document = render_document(sequence, params, options)?;
    write_atomically(output_path, document.as_bytes())?;
    info!(
        path = %output_path.display(),
        points = sequence.len(),
        bytes = document.len(),
        "track map written"
    );
    Ok(())
}

/// Fills the track map template. Identical inputs give byte-identical output.
pub fn render_document(
    sequence: &TrackSequence,
    params: &RunParameters,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let first = sequence.first();
    let title = if params.display_label().is_empty() {
        "Track map".to_string()
    } else {
        format!("Track map: {}", params.display_label())
    };

    let slots = [
        ("title", escape_html(&title)),
        ("map_api_key", encode_query_value(params.map_api_key())),
        ("zoom", options.zoom.to_string()),
        ("center_longitude", script_json(&first.longitude)?),
        ("center_latitude", script_json(&first.latitude)?),
        ("display_label", script_json(params.display_label())?),
        ("points_json", script_json(sequence.points())?),
        (
            "animation_interval_ms",
            params.animation_interval_ms().to_string(),
        ),
        ("startup_delay_ms", options.startup_delay_ms.to_string()),
    ];

    fill_slots(TRACK_MAP_TEMPLATE, &slots)
}

/// Replaces every `{{ name }}` in `template`. Unknown slot names and values that no slot uses
/// are both errors.
pub(crate) fn fill_slots(template: &str, slots: &[(&str, String)]) -> Result<String, RenderError> {
    let extra: usize = slots.iter().map(|(_, value)| value.len()).sum();
    let mut output = String::with_capacity(template.len() + extra);
    let mut used = vec![false; slots.len()];
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        output.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after.find("}}").ok_or_else(|| RenderError::Template {
            message: "unterminated slot".to_string(),
        })?;
        let name = after[..close].trim();
        let position = slots
            .iter()
            .position(|(slot, _)| *slot == name)
            .ok_or_else(|| RenderError::Template {
                message: format!("template references unknown slot '{name}'"),
            })?;
        output.push_str(&slots[position].1);
        used[position] = true;
        rest = &after[close + 2..];
    }
    output.push_str(rest);

    if let Some(unused) = used.iter().position(|was_used| !was_used) {
        return Err(RenderError::Template {
            message: format!("slot '{}' is not present in the template", slots[unused].0),
        });
    }

    Ok(output)
}

/// JSON that can sit inside a `<script>` element: `<`, `>` and `&` are emitted as unicode
/// escapes, which only ever occur inside JSON strings.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), RenderError> {
    let io_error = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(contents).map_err(io_error)?;
    // temporary files are created owner-only
    carry_permissions(file.as_file(), path).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

/// Gives the replacement the permissions of the file it replaces, or the usual `0644` for a new
/// file.
fn carry_permissions(file: &File, target: &Path) -> io::Result<()> {
    match fs::metadata(target) {
        Ok(existing) => file.set_permissions(existing.permissions()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => set_new_file_permissions(file),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn set_new_file_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_new_file_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}

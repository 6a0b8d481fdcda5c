//! Bash migration script generation.
//!
//! The script copies, never moves: running it twice gives the same result.
//!
//! ```text
//! #!/usr/bin/env bash
//! COMMAND=... SOURCE=... DESTINATION=... DATE_CREATED=... TIME_12HR=... TIME_24HR=...
//! <confirmation prompt>
//! keep_files() { ... }          one line per companion extension
//! cd "${SOURCE}"
//! mkdir -p / cp ...             depth-first over the tree
//! keep_files "src dir" "dst dir"
//! ```

use chrono::{Local, NaiveDateTime};
use log::{debug, info};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::EmitResult;
use crate::tree::{DestinationTree, NodeKind};

const CONFIRMATION: &str = r#"# Ensuring user really wants to migrate files
echo "This file is an automatic tag-based music organizer. It's potentially dangerous."
echo "It was generated on ${DATE_CREATED} (yyyy-mm-dd) at ${TIME_12HR} (${TIME_24HR})"
echo "The command used to generate it was ${COMMAND}"
echo ""
echo "This script will organize music from ${SOURCE} into ${DESTINATION}"
read -r -p "Are you sure you want to run this? [y/N] " response
case ${response} in
    [Yy][Ee][Ss]|[Yy])
        echo "Organizing music..."
        ;;
    *)
        echo "User didn't give permission; aborting"
        exit
        ;;
esac
"#;

/// Escape for use inside a double-quoted shell string.
pub fn shell_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `"${VAR}/relative"`, or `"${VAR}"` when `relative` is empty.
fn under(var: &str, relative: &Path) -> String {
    if relative.as_os_str().is_empty() {
        format!("\"${{{var}}}\"")
    } else {
        format!(
            "\"${{{var}}}/{}\"",
            shell_escape(&relative.to_string_lossy())
        )
    }
}

/// Renders a [`DestinationTree`] as a bash script.
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    source: PathBuf,
    keep_formats: Vec<String>,
    command: String,
    created: NaiveDateTime,
}

impl ScriptWriter {
    /// Writer copying from `source` (the scan root).
    pub fn new(source: impl Into<PathBuf>, keep_formats: Vec<String>) -> Self {
        Self {
            source: source.into(),
            keep_formats,
            command: String::new(),
            created: Local::now().naive_local(),
        }
    }

    /// Command line recorded in the script header.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_timestamp(mut self, created: NaiveDateTime) -> Self {
        self.created = created;
        self
    }

    pub fn write<W: Write>(&self, tree: &DestinationTree, out: &mut W) -> EmitResult<()> {
        self.write_header(tree, out)?;

        let mut directories = 0;
        let mut copies = 0;
        for (id, node) in tree.iter() {
            match node.kind() {
                NodeKind::Directory { .. } => {
                    let relative = tree.path_of(id);
                    let display = shell_escape(&relative.to_string_lossy());
                    writeln!(out)?;
                    writeln!(out, "# Creating directory for \"{display}\"")?;
                    writeln!(out, "mkdir -p {}", under("DESTINATION", &relative))?;
                    if id != tree.root() {
                        writeln!(out, "echo \"Migrating to {display}\"")?;
                    }
                    directories += 1;
                }
                NodeKind::Leaf(mapping) => {
                    writeln!(
                        out,
                        "cp {} {}",
                        under("SOURCE", &mapping.source),
                        under("DESTINATION", &mapping.destination)
                    )?;
                    copies += 1;
                }
            }
        }

        let companions = self.write_companions(tree, out)?;
        out.flush()?;

        info!(
            "Script: {} directories, {} copies, {} companion passes",
            directories, copies, companions
        );
        Ok(())
    }

    /// Write the script to `path` and mark it executable.
    pub fn write_to_file(&self, tree: &DestinationTree, path: &Path) -> EmitResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(tree, &mut out)?;
        drop(out);
        make_executable(path)?;
        debug!("Wrote migration script to {}", path.display());
        Ok(())
    }

    fn write_header<W: Write>(&self, tree: &DestinationTree, out: &mut W) -> EmitResult<()> {
        writeln!(out, "#!/usr/bin/env bash")?;
        writeln!(out)?;
        writeln!(out, "COMMAND=\"{}\"", shell_escape(&self.command))?;
        writeln!(
            out,
            "SOURCE=\"{}\"",
            shell_escape(&self.source.to_string_lossy())
        )?;
        writeln!(out, "DESTINATION=\"{}\"", shell_escape(tree.destination()))?;
        writeln!(out, "DATE_CREATED=\"{}\"", self.created.format("%Y-%m-%d"))?;
        writeln!(out, "TIME_12HR=\"{}\"", self.created.format("%I:%M:%S %p"))?;
        writeln!(out, "TIME_24HR=\"{}\"", self.created.format("%H:%M:%S"))?;
        writeln!(out)?;
        writeln!(out, "{CONFIRMATION}")?;

        writeln!(out, "keep_files() {{")?;
        if self.keep_formats.is_empty() {
            writeln!(out, "    :")?;
        }
        for format in &self.keep_formats {
            let wildcard = format!("\"${{1}}\"/*.{}", shell_escape(format));
            writeln!(
                out,
                "    if ls {wildcard} 1> /dev/null 2>&1; then cp {wildcard} \"${{2}}\"; fi"
            )?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(
            out,
            "# Setting working directory to {}",
            shell_escape(&self.source.to_string_lossy())
        )?;
        writeln!(out, "cd \"${{SOURCE}}\"")?;
        Ok(())
    }

    /// One `keep_files` call per distinct (source dir, destination dir).
    fn write_companions<W: Write>(
        &self,
        tree: &DestinationTree,
        out: &mut W,
    ) -> EmitResult<usize> {
        if self.keep_formats.is_empty() {
            return Ok(0);
        }

        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "# Moving companion files to new location")?;
        writeln!(
            out,
            "echo \"Migrating files with the following extensions: {}\"",
            shell_escape(&self.keep_formats.join(" "))
        )?;

        let mut seen = HashSet::new();
        for mapping in tree.mappings() {
            let source_dir = mapping.source.parent().unwrap_or(Path::new(""));
            let destination_dir = mapping.destination.parent().unwrap_or(Path::new(""));
            if !seen.insert((source_dir, destination_dir)) {
                continue;
            }
            writeln!(
                out,
                "keep_files {} {}",
                under("SOURCE", source_dir),
                under("DESTINATION", destination_dir)
            )?;
        }
        Ok(seen.len())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    std::fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

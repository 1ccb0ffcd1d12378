//! Rewrites `import`/`from` statements after an inter-file move (§4.6) so
//! references to a relocated definition follow it to its new module.
//! Scope: Python and JS/TS, triggered only when at least one
//! [`InterFileMove`] was produced. Runs after synthesis, since it must see
//! the final files on disk; staging the rewritten files is the caller's
//! job (it already holds the `VcsDriver`).

use regex::Regex;
use semerge_core::types::{ImportUpdate, InterFileMove};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SKIP_DIRS: &[&str] = &["node_modules", "__pycache__", "venv", "vendor"];

/// `src/utils/helpers.py` -> `src.utils.helpers`.
pub fn module_name(path: &str) -> String {
    let no_ext = path.rsplit_once('.').map_or(path, |(stem, _)| stem);
    no_ext.replace(['/', '\\'], ".")
}

/// `(source_module, def_name) -> destination_module`, built from every
/// move this invocation's §4.6 pass produced.
pub fn build_move_index(moves: &[InterFileMove]) -> HashMap<(String, String), String> {
    moves
        .iter()
        .map(|m| ((module_name(&m.source_file), m.name.clone()), module_name(&m.destination_file)))
        .collect()
}

pub struct RewriteOptions {
    pub workspace_root: PathBuf,
    pub dry_run: bool,
}

/// Scan the tree, compute replacement import lines wherever a moved name is
/// imported, and (unless `dry_run`) write them. Walk errors and unreadable
/// files are logged and skipped; they never fail the overall rewrite.
pub fn rewrite_imports(moves: &[InterFileMove], options: &RewriteOptions) -> io::Result<Vec<ImportUpdate>> {
    if moves.is_empty() {
        return Ok(Vec::new());
    }
    let index = build_move_index(moves);
    let python_re = python_import_regex();
    let js_re = js_import_regex();

    let mut updates = Vec::new();
    for entry in WalkDir::new(&options.workspace_root).into_iter().filter_entry(|e| !is_skipped(e.path())) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(error = %err, "import rewrite: walk error, skipping entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(&options.workspace_root).unwrap_or(path).to_path_buf();
        let outcome = match path.extension().and_then(|e| e.to_str()) {
            Some("py") => python_file_updates(path, &rel, &python_re, &index),
            Some("js") | Some("jsx") | Some("mjs") | Some("cjs") | Some("ts") | Some("tsx") => {
                js_file_updates(path, &rel, &js_re, &index)
            }
            _ => Ok(Vec::new()),
        };
        match outcome {
            Ok(mut file_updates) => updates.append(&mut file_updates),
            Err(err) => tracing::warn!(file = %rel.display(), error = %err, "import rewrite: unreadable file, skipping"),
        }
    }

    if !options.dry_run {
        apply_updates(&options.workspace_root, &updates)?;
    }
    Ok(updates)
}

fn is_skipped(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with('.') || SKIP_DIRS.contains(&n))
}

fn python_import_regex() -> Regex {
    Regex::new(r"^\s*from\s+([\w.]+)\s+import\s+([^#]+?)\s*(#.*)?$").expect("static pattern")
}

fn js_import_regex() -> Regex {
    Regex::new(r#"^\s*import\s*\{([^}]+)\}\s*from\s*['"]([^'"]+)['"]\s*;?\s*$"#).expect("static pattern")
}

/// Splits a comma-separated `a, b as c, d` list, stripping `as <alias>` and
/// retaining the original (pre-alias) name.
fn parse_name_list(raw: &str) -> Vec<String> {
    raw.trim_matches(|c| c == '(' || c == ')')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|piece| piece.split_whitespace().next().unwrap_or(piece).to_string())
        .collect()
}

struct Partition {
    remaining: Vec<String>,
    moved_by_dest: HashMap<String, Vec<String>>,
}

fn partition(names: &[String], module: &str, index: &HashMap<(String, String), String>) -> Partition {
    let mut remaining = Vec::new();
    let mut moved_by_dest: HashMap<String, Vec<String>> = HashMap::new();
    for name in names {
        match index.get(&(module.to_string(), name.clone())) {
            Some(dest) => moved_by_dest.entry(dest.clone()).or_default().push(name.clone()),
            None => remaining.push(name.clone()),
        }
    }
    Partition { remaining, moved_by_dest }
}

fn sorted_destinations(moved_by_dest: &HashMap<String, Vec<String>>) -> Vec<&String> {
    let mut dests: Vec<&String> = moved_by_dest.keys().collect();
    dests.sort();
    dests
}

fn python_file_updates(path: &Path, rel: &Path, re: &Regex, index: &HashMap<(String, String), String>) -> io::Result<Vec<ImportUpdate>> {
    let content = fs::read_to_string(path)?;
    let mut updates = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        let Some(caps) = re.captures(line) else { continue };
        let module = caps[1].to_string();
        let names = parse_name_list(&caps[2]);
        let Partition { remaining, moved_by_dest } = partition(&names, &module, index);
        if moved_by_dest.is_empty() {
            continue;
        }

        let mut replacement_lines = Vec::new();
        if !remaining.is_empty() {
            replacement_lines.push(format!("from {module} import {}", remaining.join(", ")));
        }
        let dests = sorted_destinations(&moved_by_dest);
        for dest in &dests {
            replacement_lines.push(format!("from {dest} import {}", moved_by_dest[*dest].join(", ")));
        }

        updates.push(ImportUpdate {
            file: display_path(rel),
            original_line: line.to_string(),
            replacement: replacement_lines.join("\n"),
            line_number: (line_idx + 1) as u32,
            source_module: module,
            destination_module: dests.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(","),
            moved_names: moved_by_dest.into_values().flatten().collect(),
        });
    }
    Ok(updates)
}

fn js_file_updates(path: &Path, rel: &Path, re: &Regex, index: &HashMap<(String, String), String>) -> io::Result<Vec<ImportUpdate>> {
    let content = fs::read_to_string(path)?;
    let current_dir = rel.parent().unwrap_or_else(|| Path::new(""));
    let mut updates = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        let Some(caps) = re.captures(line) else { continue };
        let names = parse_name_list(&caps[1]);
        let import_path = caps[2].to_string();
        let module = resolve_js_module(current_dir, &import_path);
        let Partition { remaining, moved_by_dest } = partition(&names, &module, index);
        if moved_by_dest.is_empty() {
            continue;
        }

        let mut replacement_lines = Vec::new();
        if !remaining.is_empty() {
            replacement_lines.push(format!("import {{ {} }} from '{import_path}';", remaining.join(", ")));
        }
        let dests = sorted_destinations(&moved_by_dest);
        for dest in &dests {
            let rel_path = relative_import_path(current_dir, dest);
            replacement_lines.push(format!("import {{ {} }} from '{rel_path}';", moved_by_dest[*dest].join(", ")));
        }

        updates.push(ImportUpdate {
            file: display_path(rel),
            original_line: line.to_string(),
            replacement: replacement_lines.join("\n"),
            line_number: (line_idx + 1) as u32,
            source_module: module,
            destination_module: dests.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(","),
            moved_names: moved_by_dest.into_values().flatten().collect(),
        });
    }
    Ok(updates)
}

fn display_path(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Non-relative paths (bare package names) pass through unchanged; relative
/// ones are joined against the importing file's directory, cleaned of `.`/
/// `..`, and dotted.
fn resolve_js_module(current_dir: &Path, import_path: &str) -> String {
    if !import_path.starts_with('.') {
        return import_path.to_string();
    }
    let joined = clean_path(&current_dir.join(import_path));
    display_path(&joined).replace('/', ".")
}

fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<std::ffi::OsString> = Vec::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str().to_os_string()),
        }
    }
    out.into_iter().collect()
}

/// Dotted `destination_module` back to a `./`- or `../`-prefixed, extension-
/// free path relative to the importing file's directory.
fn relative_import_path(current_dir: &Path, destination_module: &str) -> String {
    let dest_path: PathBuf = destination_module.split('.').collect();
    let cur: Vec<_> = current_dir.components().collect();
    let dst: Vec<_> = dest_path.components().collect();
    let mut common = 0;
    while common < cur.len() && common < dst.len() && cur[common] == dst[common] {
        common += 1;
    }
    let mut result = PathBuf::new();
    for _ in common..cur.len() {
        result.push("..");
    }
    for component in &dst[common..] {
        result.push(component.as_os_str());
    }
    let joined = display_path(&result);
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

/// Groups updates by file and rewrites each from the highest line number to
/// the lowest, so an earlier multi-line replacement never shifts the line
/// number of one still pending in the same file.
fn apply_updates(workspace_root: &Path, updates: &[ImportUpdate]) -> io::Result<()> {
    let mut by_file: HashMap<&str, Vec<&ImportUpdate>> = HashMap::new();
    for update in updates {
        by_file.entry(update.file.as_str()).or_default().push(update);
    }
    for (file, mut file_updates) in by_file {
        file_updates.sort_by(|a, b| b.line_number.cmp(&a.line_number));
        let path = workspace_root.join(file);
        let content = fs::read_to_string(&path)?;
        let had_trailing_newline = content.ends_with('\n');
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        for update in file_updates {
            let idx = (update.line_number - 1) as usize;
            if idx >= lines.len() {
                continue;
            }
            let replacement: Vec<String> = update.replacement.lines().map(str::to_string).collect();
            lines.splice(idx..=idx, replacement);
        }
        let mut new_content = lines.join("\n");
        if had_trailing_newline {
            new_content.push('\n');
        }
        fs::write(&path, new_content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semerge_core::types::MatchType;
    use std::fs;
    use tempfile::tempdir;

    fn helper_move() -> InterFileMove {
        InterFileMove {
            source_file: "utils.py".to_string(),
            destination_file: "newutils.py".to_string(),
            name: "helper".to_string(),
            destination_name: "helper".to_string(),
            kind: semerge_core::types::DefinitionKind::Function,
            match_type: MatchType::Exact,
            similarity: 1.0,
        }
    }

    #[test]
    fn module_name_dots_the_path() {
        assert_eq!(module_name("src/utils/helpers.py"), "src.utils.helpers");
    }

    #[test]
    fn python_import_rewritten_when_moved_name_is_sole_import() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "from utils import helper\n").unwrap();
        fs::write(dir.path().join("utils.py"), "\n").unwrap();
        fs::write(dir.path().join("newutils.py"), "\n").unwrap();
        let moves = vec![helper_move()];
        let options = RewriteOptions { workspace_root: dir.path().to_path_buf(), dry_run: false };
        let updates = rewrite_imports(&moves, &options).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].replacement, "from newutils import helper");
        let rewritten = fs::read_to_string(dir.path().join("main.py")).unwrap();
        assert_eq!(rewritten, "from newutils import helper\n");
    }

    #[test]
    fn python_import_keeps_remaining_names_on_original_line() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "from utils import helper, other\n").unwrap();
        let moves = vec![helper_move()];
        let options = RewriteOptions { workspace_root: dir.path().to_path_buf(), dry_run: false };
        let updates = rewrite_imports(&moves, &options).unwrap();
        assert_eq!(updates[0].replacement, "from utils import other\nfrom newutils import helper");
    }

    #[test]
    fn python_alias_retains_original_name_for_matching() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "from utils import helper as h\n").unwrap();
        let moves = vec![helper_move()];
        let options = RewriteOptions { workspace_root: dir.path().to_path_buf(), dry_run: false };
        let updates = rewrite_imports(&moves, &options).unwrap();
        assert_eq!(updates[0].moved_names, vec!["helper".to_string()]);
    }

    #[test]
    fn dry_run_reports_updates_without_writing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "from utils import helper\n").unwrap();
        let moves = vec![helper_move()];
        let options = RewriteOptions { workspace_root: dir.path().to_path_buf(), dry_run: true };
        let updates = rewrite_imports(&moves, &options).unwrap();
        assert_eq!(updates.len(), 1);
        let untouched = fs::read_to_string(dir.path().join("main.py")).unwrap();
        assert_eq!(untouched, "from utils import helper\n");
    }

    #[test]
    fn js_relative_import_resolved_against_importing_file_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.js"), "import { helper } from './utils';\n").unwrap();
        let moves = vec![InterFileMove {
            source_file: "src/utils.js".to_string(),
            destination_file: "src/lib/newutils.js".to_string(),
            name: "helper".to_string(),
            destination_name: "helper".to_string(),
            kind: semerge_core::types::DefinitionKind::Function,
            match_type: MatchType::Exact,
            similarity: 1.0,
        }];
        let options = RewriteOptions { workspace_root: dir.path().to_path_buf(), dry_run: false };
        let updates = rewrite_imports(&moves, &options).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].replacement, "import { helper } from './lib/newutils';");
    }

    #[test]
    fn no_moves_short_circuits_without_walking() {
        let dir = tempdir().unwrap();
        let options = RewriteOptions { workspace_root: dir.path().to_path_buf(), dry_run: false };
        assert!(rewrite_imports(&[], &options).unwrap().is_empty());
    }
}

//! Byte-exact synthesis: rewrite the LOCAL canvas to apply auto-merged
//! decisions and insert conflict markers where manual resolution is
//! required.

use crate::similarity::norm;
use crate::types::{Conflict, ConflictStatus, UserResolution};

/// Result of synthesizing one file.
#[derive(Debug, Clone)]
pub struct SynthResult {
    pub bytes: Vec<u8>,
    pub total_conflicts: u32,
    pub resolved_count: u32,
    pub all_auto_merged: bool,
    pub has_markers: bool,
}

/// Resolve byte-range collisions (§4.7): sort by local start position
/// ascending; whenever an earlier conflict's local range swallows a later
/// one's, force the earlier (outer) conflict to `NeedsResolution` with
/// `(Collision Detected)` appended to its type, and drop the later (inner)
/// conflict entirely. Conflicts with no local range (pure orphans) never
/// participate and are returned untouched.
pub fn resolve_collisions(conflicts: Vec<Conflict>) -> Vec<Conflict> {
    let mut with_range: Vec<Conflict> = Vec::new();
    let mut without_range: Vec<Conflict> = Vec::new();
    for c in conflicts {
        if c.local_range().is_some() {
            with_range.push(c);
        } else {
            without_range.push(c);
        }
    }
    with_range.sort_by_key(|c| c.local_range().unwrap().start);

    let mut result: Vec<Conflict> = Vec::new();
    let mut iter = with_range.into_iter();
    if let Some(mut outer) = iter.next() {
        for next in iter {
            let outer_range = outer.local_range().unwrap();
            let next_range = next.local_range().unwrap();
            if outer_range.end > next_range.start {
                if !outer.conflict_type.ends_with("(Collision Detected)") {
                    outer.conflict_type = format!("{} (Collision Detected)", outer.conflict_type);
                }
                outer.status = ConflictStatus::NeedsResolution;
                // `next` is dropped; keep comparing subsequent items against
                // the same outer in case of multiple nested children.
            } else {
                result.push(outer);
                outer = next;
            }
        }
        result.push(outer);
    }
    result.extend(without_range);
    result
}

/// A concrete byte-level edit: replace `[start, end)` in the canvas with
/// `replacement`. `start == end` represents a pure insertion.
struct PositionedEdit {
    start: usize,
    end: usize,
    replacement: Vec<u8>,
    is_marker: bool,
}

/// Synthesize the output bytes for one file from its LOCAL canvas and its
/// (already collision-resolved) conflict list.
pub fn synthesize(local_canvas: &[u8], conflicts: &[Conflict]) -> SynthResult {
    let mut edits: Vec<PositionedEdit> = Vec::new();
    let mut tail_appends: Vec<Vec<u8>> = Vec::new();
    let mut resolved_count = 0u32;
    let mut has_markers = false;

    for c in conflicts {
        let (edit, resolved) = plan_conflict(c, local_canvas.len());
        if resolved {
            resolved_count += 1;
        }
        match edit {
            PlannedEdit::InPlace(e) => {
                if e.is_marker {
                    has_markers = true;
                }
                edits.push(e);
            }
            PlannedEdit::Append(bytes) => {
                tail_appends.push(bytes);
            }
            PlannedEdit::None => {}
        }
    }

    // Tail-first: sort descending by start so earlier splices don't
    // invalidate later offsets.
    edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    let mut canvas = local_canvas.to_vec();
    for edit in &edits {
        canvas.splice(edit.start..edit.end, edit.replacement.iter().copied());
    }

    for body in tail_appends {
        append_with_separator(&mut canvas, &body);
    }

    SynthResult {
        bytes: canvas,
        total_conflicts: conflicts.len() as u32,
        resolved_count,
        all_auto_merged: conflicts.iter().all(|c| c.status == ConflictStatus::CanAutoMerge),
        has_markers,
    }
}

enum PlannedEdit {
    InPlace(PositionedEdit),
    Append(Vec<u8>),
    None,
}

/// Decide what to do with one conflict. Returns the planned edit and whether
/// the conflict counts as "resolved" (every CanAutoMerge conflict and every
/// conflict with a user resolution other than `Skip` is resolved; a
/// `NeedsResolution` conflict left untouched, or explicitly `Skip`ped, is
/// not).
fn plan_conflict(c: &Conflict, canvas_len: usize) -> (PlannedEdit, bool) {
    if c.user_resolution != UserResolution::None {
        return plan_user_resolution(c, canvas_len);
    }
    match c.status {
        ConflictStatus::CanAutoMerge => (plan_auto_merge(c), true),
        ConflictStatus::NeedsResolution => (plan_markers(c, canvas_len), false),
    }
}

fn plan_user_resolution(c: &Conflict, canvas_len: usize) -> (PlannedEdit, bool) {
    match c.user_resolution {
        UserResolution::None => unreachable!(),
        UserResolution::KeepLocal => (PlannedEdit::None, true),
        UserResolution::KeepRemote => {
            let remote_body = c.remote.as_ref().map(|d| d.body.clone()).unwrap_or_default();
            (replace_or_append(c, remote_body, canvas_len), true)
        }
        UserResolution::KeepBase => {
            let base_body = c.base.as_ref().map(|d| d.body.clone()).unwrap_or_default();
            (replace_or_append(c, base_body, canvas_len), true)
        }
        UserResolution::KeepBoth => {
            let mut combined = c.local.as_ref().map(|d| d.body.clone()).unwrap_or_default();
            if let Some(remote) = &c.remote {
                if !combined.is_empty() && !combined.ends_with(b"\n") {
                    combined.push(b'\n');
                }
                if !combined.is_empty() {
                    combined.push(b'\n');
                }
                combined.extend_from_slice(&remote.body);
            }
            (replace_or_append(c, combined, canvas_len), true)
        }
        UserResolution::Skip => (plan_markers(c, canvas_len), false),
    }
}

fn replace_or_append(c: &Conflict, bytes: Vec<u8>, canvas_len: usize) -> PlannedEdit {
    if let Some(range) = c.local_range() {
        PlannedEdit::InPlace(PositionedEdit { start: range.start, end: range.end, replacement: bytes, is_marker: false })
    } else if !bytes.is_empty() {
        PlannedEdit::Append(bytes)
    } else {
        let _ = canvas_len;
        PlannedEdit::None
    }
}

fn plan_auto_merge(c: &Conflict) -> PlannedEdit {
    match (c.local.as_ref(), c.remote.as_ref(), c.base.as_ref()) {
        (Some(local), Some(remote), base) => {
            // "Updated (local)": remote unchanged vs base, local carries the
            // real edit. Keep local untouched.
            if let Some(base) = base {
                let r_eq_b = norm(&remote.body_str()) == norm(&base.body_str());
                let l_eq_b = norm(&local.body_str()) == norm(&base.body_str());
                if r_eq_b && !l_eq_b {
                    return PlannedEdit::None;
                }
            }
            if local.body == remote.body {
                PlannedEdit::None
            } else {
                PlannedEdit::InPlace(PositionedEdit {
                    start: local.start_byte,
                    end: local.end_byte,
                    replacement: remote.body.clone(),
                    is_marker: false,
                })
            }
        }
        (Some(local), None, base) => {
            // "Deleted (remote)": local unchanged vs base, remote removed it.
            if base.is_some() {
                PlannedEdit::InPlace(PositionedEdit { start: local.start_byte, end: local.end_byte, replacement: Vec::new(), is_marker: false })
            } else {
                // Pure local-only add with nothing to reconcile against.
                PlannedEdit::None
            }
        }
        (None, Some(remote), base) => {
            if base.is_some() {
                // "Deleted (local)": local already removed it and remote's
                // copy is base-equivalent. The span is already absent from
                // the canvas; nothing to append back.
                PlannedEdit::None
            } else {
                // True orphan-add-via-move: no base to reconcile against,
                // so the only place this definition exists is remote's body.
                PlannedEdit::Append(remote.body.clone())
            }
        }
        (None, _, _) => PlannedEdit::None,
    }
}

fn plan_markers(c: &Conflict, canvas_len: usize) -> PlannedEdit {
    let local_body = c.local.as_ref().map(|d| d.body_str().into_owned()).unwrap_or_default();
    let remote_body = c.remote.as_ref().map(|d| d.body_str().into_owned()).unwrap_or_default();
    let marker = format!("<<<<<<< LOCAL\n{local_body}\n=======\n{remote_body}\n>>>>>>> REMOTE");

    if let Some(range) = c.local_range() {
        PlannedEdit::InPlace(PositionedEdit { start: range.start, end: range.end, replacement: marker.into_bytes(), is_marker: true })
    } else {
        // No local span: anchor on base's original position as a best-effort
        // insertion point (§4.7); fall back to the canvas end when there is
        // no base either (a pure remote-only addition under dispute).
        let anchor = c.base.as_ref().map(|d| d.start_byte.min(canvas_len)).unwrap_or(canvas_len);
        PlannedEdit::InPlace(PositionedEdit { start: anchor, end: anchor, replacement: marker.into_bytes(), is_marker: true })
    }
}

/// Append `body` to `canvas`, ensuring the canvas ends with a newline first
/// and prepending a blank-line separator when the canvas already had
/// content.
fn append_with_separator(canvas: &mut Vec<u8>, body: &[u8]) {
    if !canvas.is_empty() {
        if !canvas.ends_with(b"\n") {
            canvas.push(b'\n');
        }
        canvas.push(b'\n');
    }
    canvas.extend_from_slice(body);
}

//! Capacity ledger: pure fit checks and counter deltas.
//!
//! Nothing here performs I/O. Callers load folders, ask the ledger what to
//! change, and write the result back while holding the folder's lock.

use serde::{Deserialize, Serialize};

use paperhub_core::error::AppError;
use paperhub_core::result::AppResult;
use paperhub_core::types::FolderId;
use paperhub_entity::folder::Folder;

/// Where a document's sheets are reserved, before or after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Folder holding the reservation, if any.
    pub folder_id: Option<FolderId>,
    /// Sheets reserved.
    pub sheets: i32,
}

impl Placement {
    /// Creates a placement.
    pub fn new(folder_id: Option<FolderId>, sheets: i32) -> Self {
        Self { folder_id, sheets }
    }
}

/// A positive amount of sheets to move in or out of one folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    /// The folder to adjust.
    pub folder_id: FolderId,
    /// Sheets to free or reserve (always > 0).
    pub sheets: i32,
}

/// Counter changes implied by moving from one [`Placement`] to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transition {
    /// Folder to decrement; applied without a fit check.
    pub free_from: Option<Adjustment>,
    /// Folder to increment; must pass [`fits`] first.
    pub reserve_into: Option<Adjustment>,
}

impl Transition {
    /// Returns `true` if no counter changes.
    pub fn is_noop(&self) -> bool {
        self.free_from.is_none() && self.reserve_into.is_none()
    }

    /// Folders touched, ascending and deduplicated (the lock order).
    pub fn folders(&self) -> Vec<FolderId> {
        let mut ids: Vec<FolderId> = self
            .free_from
            .iter()
            .chain(self.reserve_into.iter())
            .map(|a| a.folder_id)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Returns `true` if `requested_sheets` more sheets fit in the folder.
pub fn fits(folder: &Folder, requested_sheets: i32) -> bool {
    i64::from(folder.total_sheets) - i64::from(folder.used_sheets) >= i64::from(requested_sheets)
}

/// Returns the folder with `used_sheets` shifted by `delta`.
///
/// Positive deltas must have passed [`fits`]. The result is never clamped:
/// a negative counter, or an increment past capacity, is reported as
/// `InvariantViolation`.
pub fn apply_delta(folder: &Folder, delta: i32) -> AppResult<Folder> {
    let used = folder.used_sheets.checked_add(delta).ok_or_else(|| {
        AppError::invariant_violation(format!(
            "Folder {} sheet counter overflowed applying {delta}",
            folder.id
        ))
    })?;

    if used < 0 {
        return Err(AppError::invariant_violation(format!(
            "Folder {} would hold {used} sheets after applying {delta} to {}",
            folder.id, folder.used_sheets
        )));
    }
    if delta > 0 && used > folder.total_sheets {
        return Err(AppError::invariant_violation(format!(
            "Folder {} would hold {used} of {} sheets; reservation was not fit-checked",
            folder.id, folder.total_sheets
        )));
    }

    Ok(Folder {
        used_sheets: used,
        ..folder.clone()
    })
}

/// Computes which folder to free and which to reserve into.
///
/// - same folder, same sheets: nothing
/// - same folder, new sheet count: one adjustment by the difference,
///   a reservation if it grew, a release if it shrank
/// - different folder (including to or from none): free the old folder's
///   full `old.sheets`, reserve the new folder's full `new.sheets`
pub fn delta_for_transition(old: Placement, new: Placement) -> Transition {
    match (old.folder_id, new.folder_id) {
        (Some(before), Some(after)) if before == after => {
            let diff = new.sheets - old.sheets;
            if diff > 0 {
                Transition {
                    free_from: None,
                    reserve_into: Some(Adjustment {
                        folder_id: after,
                        sheets: diff,
                    }),
                }
            } else if diff < 0 {
                Transition {
                    free_from: Some(Adjustment {
                        folder_id: before,
                        sheets: -diff,
                    }),
                    reserve_into: None,
                }
            } else {
                Transition::default()
            }
        }
        (before, after) => Transition {
            free_from: before.map(|folder_id| Adjustment {
                folder_id,
                sheets: old.sheets,
            }),
            reserve_into: after.map(|folder_id| Adjustment {
                folder_id,
                sheets: new.sheets,
            }),
        },
    }
}

use crate::data::model::{FilterSelection, TripTable};

// ---------------------------------------------------------------------------
// Session stages
// ---------------------------------------------------------------------------

/// Where one pass of the session currently is.
///
/// Every pass runs `Collecting → Loading → Reporting → Paging → AskRestart`
/// in order; an empty table skips straight from `Loading` to `AskRestart`.
/// Nothing carries over from one pass to the next.
#[derive(Debug)]
pub enum Stage {
    Collecting,
    Loading(FilterSelection),
    Reporting(TripTable),
    Paging(TripTable),
    AskRestart,
    Done,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Collecting => "collecting",
            Stage::Loading(_) => "loading",
            Stage::Reporting(_) => "reporting",
            Stage::Paging(_) => "paging",
            Stage::AskRestart => "ask-restart",
            Stage::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Stage::Done)
    }

    /// Stage after a table has been loaded.
    pub fn after_load(table: TripTable) -> Stage {
        if table.is_empty() {
            Stage::AskRestart
        } else {
            Stage::Reporting(table)
        }
    }

    /// Stage after the restart question.
    pub fn after_restart(answer: Option<&str>) -> Stage {
        match answer {
            Some(a) if a.trim().eq_ignore_ascii_case("yes") => Stage::Collecting,
            _ => Stage::Done,
        }
    }
}

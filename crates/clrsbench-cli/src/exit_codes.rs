//! Exit codes for the clrsbench binary. Part of the scripting contract.

pub const SUCCESS: i32 = 0;
/// Bad CLI input or an unreadable prompt collection; also the fallback for
/// fatal errors surfaced through `main` (e.g. artifact persistence).
pub const CONFIG_ERROR: i32 = 2;

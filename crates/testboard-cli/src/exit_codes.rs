//! Process exit codes. Scripts depend on these; keep them stable.

use testboard_core::BoardError;

pub const SUCCESS: i32 = 0;
pub const CONFIG_ERROR: i32 = 2; // Bad input, query or configuration
pub const IO_ERROR: i32 = 3; // Filesystem or cache failure

/// Exit code for a failed command: the engine's own code when the chain
/// carries a [`BoardError`], otherwise `CONFIG_ERROR`.
pub fn for_error(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BoardError>())
        .map(BoardError::exit_code)
        .unwrap_or(CONFIG_ERROR)
}

mod fame;
mod reconcile;
mod storage;
mod types;

pub use fame::{adjust_fame_with_excuses, adjusted_fame};
pub use reconcile::{add_missing_players, add_missing_wars, truncate, update_current_war, update_excuses};
pub use storage::{table_from_grid, table_to_grid};
pub use types::{ExcuseCodes, ExcuseKind, ExcuseRow, ExcuseTable};

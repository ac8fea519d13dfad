/*!
Subcommand modules.

  src/cmd/
    mod.rs      (this file: declarations + re-exports)
    list.rs     (ListArgs + execute_list)
    get.rs      (GetArgs  + execute_get)
    exec.rs     (ExecArgs + execute_exec)
    shared.rs   (param collection, param files, error output, Connection)
    format.rs   (boxes / tables / colour)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    that returns `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and are kept minimal.
*/

pub mod exec;
pub mod format;
pub mod get;
pub mod list;
pub mod shared;

pub use exec::{ExecArgs, execute_exec};
pub use get::{GetArgs, execute_get};
pub use list::{ListArgs, execute_list};
pub use shared::Connection;

// Query and path-resolution layer for a nuclear-reaction-data explorer.
//
// Translates user-facing request parameters (target nuclide, reaction
// channel, observable, branch qualifiers) into SQL predicates against the
// experimental (EXFOR) and evaluated-library (ENDF tables) stores, and into
// directory/filename lookups in the mirrored per-nuclide file trees.
pub mod config;
pub mod data;
pub mod endf;
pub mod error;
pub mod exfor;
pub mod nuclide;
pub mod paths;
pub mod reaction;
pub mod request;

pub use config::Config;
pub use endf::{EndfDataRow, EndfStore};
pub use error::{Error, Result};
pub use exfor::{
    BibEntry, DataRow, ExforStore, FissionIndexEntry, IndexEntry, SearchCriteria, SearchRow,
};
pub use paths::{endftables_file_path, exfortables_file_path, link_of_files};
pub use reaction::{
    convert_partial_reactionstr_to_inl, convert_reaction_to_exfor_style, get_mt, ReactionCode,
};
pub use request::{Observable, QueryParams};

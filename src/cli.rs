use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use embedding_explorer::CatalogKind;

#[derive(Parser, Debug)]
#[command(
    name = "embedding-explorer",
    version,
    about = "Selection state and algorithm catalogs for the embedding explorer"
)]
pub struct Cli {
    /// Catalog config file (defaults to the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print catalogs with config overrides applied
    Catalogs(CatalogsArgs),
    /// Change a selected variant or parameter and save it
    Set(SetArgs),
    /// Write the effective catalogs to the config file
    InitConfig(InitConfigArgs),
    /// Serve JSON-lines requests on stdin/stdout
    Session,
}

#[derive(Args, Debug, Clone)]
pub struct CatalogsArgs {
    /// Only print this catalog
    #[arg(long, value_enum)]
    pub kind: Option<CatalogKind>,
}

#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    #[arg(value_enum)]
    pub kind: CatalogKind,

    /// Variant to select, or whose parameter to change
    pub variant: String,

    /// Parameter name; omit to select the variant
    #[arg(long, requires = "value")]
    pub param: Option<String>,

    /// New parameter value (bool, number or text)
    #[arg(long, requires = "param")]
    pub value: Option<String>,

    /// Accept variants that are not in the catalog
    #[arg(long, default_value_t = false)]
    pub allow_unknown: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InitConfigArgs {
    /// Replace an existing file
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

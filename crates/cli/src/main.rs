//! `catalog` — manage the product catalog from the command line.
//!
//! # Usage
//!
//! ```bash
//! # List products
//! catalog list
//!
//! # Add a DVD with an image file (uploaded, or inlined when no blob store is set)
//! catalog add --type dvd --name "Acme DISC" --price 1 --size 700 \
//!     --image ./disc.png --description "Blank disc"
//!
//! # Mass delete
//! catalog delete-many JVC200123 GGWP0007
//! ```
//!
//! Configuration comes from the environment (`CATALOG_DATA_FILE`,
//! `CATALOG_BLOB_ENDPOINT`, `CATALOG_BLOB_BUCKET`, `CATALOG_BLOB_TOKEN`,
//! `CATALOG_BLOB_PUBLIC_URL`); `--data-file` overrides the snapshot path.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(author, version, about = "Product catalog")]
struct Cli {
    /// JSON snapshot to read and write
    #[arg(long, global = true, env = "CATALOG_DATA_FILE")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all products
    List {
        /// Currency prices are shown in
        #[arg(long, value_enum, default_value_t = CurrencyArg::Usd)]
        currency: CurrencyArg,
    },
    /// Show one product in full
    Show { id: String },
    /// Add a product
    Add(AddArgs),
    /// Update fields of a product
    Update {
        id: String,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete a product
    Delete { id: String },
    /// Delete several products at once
    DeleteMany {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete every product
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CurrencyArg {
    Usd,
    Eur,
    Gbp,
    Ghs,
}

#[derive(Args)]
struct SizeArgs {
    /// DVD size in MB
    #[arg(long)]
    size: Option<String>,
    /// Book weight in kg
    #[arg(long)]
    weight: Option<String>,
    /// Furniture height in cm
    #[arg(long)]
    height: Option<String>,
    /// Furniture width in cm
    #[arg(long)]
    width: Option<String>,
    /// Furniture length in cm
    #[arg(long)]
    length: Option<String>,
}

#[derive(Args)]
struct AddArgs {
    /// SKU; generated when omitted
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    name: Option<String>,
    /// Price in USD
    #[arg(long)]
    price: Option<String>,
    /// dvd, book or furniture (default book)
    #[arg(long = "type")]
    product_type: Option<String>,
    #[command(flatten)]
    size: SizeArgs,
    /// Image file to upload, or an image URL
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long = "type")]
    product_type: Option<String>,
    #[command(flatten)]
    size: SizeArgs,
    /// Image file to upload, or an image URL
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

#[tokio::main]
async fn main() {
    catalog_observability::init();

    let cli = Cli::parse();

    if let Err(err) = commands::run(cli).await {
        tracing::error!("command failed: {err:#}");
        std::process::exit(1);
    }
}

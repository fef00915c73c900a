use std::path::Path;

use anyhow::{Context, bail};

use catalog_core::{DomainError, Entity, ProductId};
use catalog_infra::{CatalogConfig, ImageUpload, ProductStore, StoreError};
use catalog_products::{Currency, Product, ProductDraft, ProductPatch, ProductType, format_currency};

use crate::{AddArgs, Cli, Commands, CurrencyArg, SizeArgs, UpdateArgs};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = CatalogConfig::from_env().context("invalid configuration")?;
    if let Some(path) = cli.data_file {
        config.data_file = path;
    }
    let store = config
        .open_store()
        .with_context(|| format!("failed to open catalog at {}", config.data_file.display()))?;

    match cli.command {
        Commands::List { currency } => list(&store, currency.into()),
        Commands::Show { id } => show(&store, &parse_id(&id)?),
        Commands::Add(args) => add(&store, args).await,
        Commands::Update { id, fields } => update(&store, &parse_id(&id)?, fields).await,
        Commands::Delete { id } => {
            let removed = store.delete(&parse_id(&id)?).await.map_err(explain)?;
            println!("deleted {}", removed.id());
            Ok(())
        }
        Commands::DeleteMany { ids } => {
            let ids = ids.iter().map(|id| parse_id(id)).collect::<anyhow::Result<Vec<_>>>()?;
            let removed = store.delete_many(&ids).await.map_err(explain)?;
            println!("deleted {} of {} products", removed.len(), ids.len());
            Ok(())
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every product without --yes");
            }
            let removed = store.clear().await.map_err(explain)?;
            println!("deleted {} products", removed.len());
            Ok(())
        }
    }
}

impl From<CurrencyArg> for Currency {
    fn from(value: CurrencyArg) -> Self {
        match value {
            CurrencyArg::Usd => Currency::Usd,
            CurrencyArg::Eur => Currency::Eur,
            CurrencyArg::Gbp => Currency::Gbp,
            CurrencyArg::Ghs => Currency::Ghs,
        }
    }
}

fn parse_id(raw: &str) -> anyhow::Result<ProductId> {
    raw.parse().with_context(|| format!("invalid product id {raw:?}"))
}

/// Flatten validation errors to one line per field.
fn explain(err: StoreError) -> anyhow::Error {
    if let Some(DomainError::Validation(msg)) = err.as_domain() {
        return anyhow::anyhow!("invalid product:\n  - {}", msg.replace("; ", "\n  - "));
    }
    err.into()
}

fn row(product: &Product, currency: Currency) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        product.id(),
        product.name(),
        format_currency(product.price(), currency),
        product.size_label()
    )
}

fn list(store: &ProductStore, currency: Currency) -> anyhow::Result<()> {
    let products = store.list();
    if products.is_empty() {
        println!("No products yet. Add one with `catalog add`.");
        return Ok(());
    }
    for product in &products {
        println!("{}", row(product, currency));
    }
    Ok(())
}

fn show(store: &ProductStore, id: &ProductId) -> anyhow::Result<()> {
    let product = store
        .get(id)
        .with_context(|| format!("no product with id {id}"))?;

    println!("id:          {}", product.id());
    println!("name:        {}", product.name());
    println!("price:       {}", format_currency(product.price(), Currency::Usd));
    println!("type:        {}", product.product_type().label());
    println!("size:        {}", product.size_label());
    println!("description: {}", product.description());
    println!("image:       {}", abbreviate(product.image()));
    println!("created:     {}", product.created_at().to_rfc3339());
    println!("updated:     {}", product.updated_at().to_rfc3339());
    Ok(())
}

/// Data URLs are too long to print whole.
fn abbreviate(image: &str) -> String {
    if image.starts_with("data:") && image.len() > 48 {
        let cut = image
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= 48)
            .last()
            .unwrap_or(0);
        format!("{}… ({} bytes)", &image[..cut], image.len())
    } else {
        image.to_string()
    }
}

/// An `--image` value naming an existing file is uploaded; anything else is
/// kept as a reference.
fn image_source(raw: Option<String>) -> anyhow::Result<(Option<String>, Option<ImageUpload>)> {
    match raw {
        Some(raw) if Path::new(&raw).is_file() => {
            let upload = ImageUpload::from_path(&raw)
                .with_context(|| format!("cannot use {raw} as product image"))?;
            Ok((None, Some(upload)))
        }
        other => Ok((other, None)),
    }
}

fn size_draft(size: SizeArgs) -> ProductDraft {
    ProductDraft {
        size: size.size,
        weight: size.weight,
        height: size.height,
        width: size.width,
        length: size.length,
        ..ProductDraft::default()
    }
}

fn has_size(size: &SizeArgs) -> bool {
    size.size.is_some()
        || size.weight.is_some()
        || size.height.is_some()
        || size.width.is_some()
        || size.length.is_some()
}

async fn add(store: &ProductStore, args: AddArgs) -> anyhow::Result<()> {
    let (image, upload) = image_source(args.image)?;

    let draft = ProductDraft {
        id: args.id,
        name: args.name,
        price: args.price,
        product_type: args.product_type,
        // the upload fills in the image reference
        image: image.or_else(|| upload.as_ref().map(|u| u.file_name().to_string())),
        description: args.description,
        ..size_draft(args.size)
    };

    let request = draft.into_request().map_err(|errs| {
        let lines: Vec<String> = errs.iter().map(|e| format!("  - {}", e.message)).collect();
        anyhow::anyhow!("invalid product:\n{}", lines.join("\n"))
    })?;

    let product = store.add(request, upload).await.map_err(explain)?;
    println!("added {}", row(&product, Currency::Usd));
    Ok(())
}

async fn update(store: &ProductStore, id: &ProductId, args: UpdateArgs) -> anyhow::Result<()> {
    let current = store
        .get(id)
        .with_context(|| format!("no product with id {id}"))?;
    let (image, upload) = image_source(args.image)?;

    let product_type = args
        .product_type
        .as_deref()
        .map(str::parse::<ProductType>)
        .transpose()
        .context("invalid --type")?;

    let size = if has_size(&args.size) {
        let ty = product_type.unwrap_or(current.product_type());
        let size = size_draft(args.size)
            .size_for(ty)
            .with_context(|| format!("{ty} needs --{}", ty.size_fields().join(" --")))?;
        Some(size)
    } else {
        None
    };

    let patch = ProductPatch {
        name: args.name,
        price: args.price,
        image,
        product_type,
        size,
        description: args.description,
    };

    let mut product = store.update(id, patch).await.map_err(explain)?;
    if let Some(upload) = upload {
        product = store.replace_image(id, upload).await.map_err(explain)?;
    }

    println!("updated {}", row(&product, Currency::Usd));
    Ok(())
}

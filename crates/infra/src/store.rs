//! The product store: state container and CRUD operations.
//!
//! Mutations are computed on a copy of the list, saved, and only then swapped
//! in, so a failed save leaves memory and disk agreeing. Image uploads happen
//! before the list lock is taken; blob cleanup happens after it is released and
//! never fails the operation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use catalog_core::{DomainError, Entity, ProductId};
use catalog_products::{Product, ProductPatch, ProductRequest};

use crate::blob::{BlobStore, ImageUpload};
use crate::error::{PersistenceError, StoreError};
use crate::persistence::LocalStorage;

pub type StoreResult<T> = Result<T, StoreError>;

pub struct ProductStore {
    products: RwLock<Vec<Product>>,
    storage: Arc<dyn LocalStorage>,
    blobs: Option<Arc<dyn BlobStore>>,
    in_flight: AtomicUsize,
}

impl core::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProductStore")
            .field("len", &self.len())
            .field("blob_store", &self.blobs.is_some())
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish()
    }
}

/// Marks an image transfer as in flight for as long as it lives.
struct Loading<'a>(&'a AtomicUsize);

impl<'a> Loading<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ProductStore {
    /// Open a store over `storage`, loading whatever it holds.
    ///
    /// Nothing saved yet means an empty catalog. Every loaded record must pass
    /// the same checks as a new one, and ids and names must be unique;
    /// otherwise the snapshot is refused as corrupt.
    pub fn open(storage: Arc<dyn LocalStorage>) -> StoreResult<Self> {
        let products = storage.load()?.unwrap_or_default();

        for (idx, product) in products.iter().enumerate() {
            product
                .check()
                .map_err(StoreError::from)
                .and_then(|()| ensure_unique(&products[..idx], product, None))
                .map_err(|err| {
                    PersistenceError::Corrupt(format!("product {}: {err}", product.id()))
                })?;
        }

        tracing::debug!(count = products.len(), "loaded product snapshot");

        Ok(Self {
            products: RwLock::new(products),
            storage,
            blobs: None,
            in_flight: AtomicUsize::new(0),
        })
    }

    /// Mirror product images to `blobs`.
    pub fn with_blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn has_blob_store(&self) -> bool {
        self.blobs.is_some()
    }

    /// True while any image upload or delete is in progress.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// All products in insertion order.
    pub fn list(&self) -> Vec<Product> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get(&self, id: &ProductId) -> Option<Product> {
        self.read().iter().find(|p| p.id() == id).cloned()
    }

    /// Validate and append a product.
    ///
    /// With an `image`, the file is uploaded to the blob store (or inlined as a
    /// data URL when there is none) and replaces `request.image`, which may
    /// then be left blank.
    #[tracing::instrument(skip_all, fields(name = %request.name))]
    pub async fn add(
        &self,
        mut request: ProductRequest,
        image: Option<ImageUpload>,
    ) -> StoreResult<Product> {
        if let Some(upload) = &image {
            if request.image.trim().is_empty() {
                request.image = upload.file_name().to_string();
            }
        }

        let now = Utc::now();
        let mut product = Product::create(request, now)?;
        ensure_unique(&self.read(), &product, None)?;

        let uploaded = match image {
            Some(upload) => {
                let url = self.store_image(product.id(), upload).await?;
                product.set_image(url.clone(), now)?;
                Some(url)
            }
            None => None,
        };

        let committed = self.commit(|list| {
            ensure_unique(list, &product, None)?;
            list.push(product.clone());
            Ok(())
        });

        if let Err(err) = committed {
            if let Some(url) = uploaded {
                self.discard_image(&url).await;
            }
            return Err(err);
        }

        tracing::info!(product_id = %product.id(), "product added");
        Ok(product)
    }

    /// Apply a partial update in place.
    #[tracing::instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update(&self, id: &ProductId, patch: ProductPatch) -> StoreResult<Product> {
        let now = Utc::now();
        let mut replaced_image = None;

        let updated = self.commit(|list| {
            let idx = position(list, id)?;
            let old_image = list[idx].image().to_string();
            list[idx].apply_patch(patch, now)?;
            ensure_unique(&list[..], &list[idx], Some(idx))?;
            if list[idx].image() != old_image {
                replaced_image = Some(old_image);
            }
            Ok(list[idx].clone())
        })?;

        if let Some(old) = replaced_image {
            self.discard_image(&old).await;
        }

        tracing::info!("product updated");
        Ok(updated)
    }

    /// Upload a new image for an existing product and drop the old one.
    #[tracing::instrument(skip(self, upload), fields(product_id = %id))]
    pub async fn replace_image(&self, id: &ProductId, upload: ImageUpload) -> StoreResult<Product> {
        if self.get(id).is_none() {
            return Err(DomainError::not_found(format!("product {id}")).into());
        }

        let url = self.store_image(id, upload).await?;
        let now = Utc::now();
        let mut old_image = String::new();

        let committed = self.commit(|list| {
            let idx = position(list, id)?;
            old_image = list[idx].image().to_string();
            list[idx].set_image(url.clone(), now)?;
            Ok(list[idx].clone())
        });

        match committed {
            Ok(product) => {
                if old_image != url {
                    self.discard_image(&old_image).await;
                }
                tracing::info!("product image replaced");
                Ok(product)
            }
            Err(err) => {
                if url != old_image {
                    self.discard_image(&url).await;
                }
                Err(err)
            }
        }
    }

    /// Remove one product.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> StoreResult<Product> {
        let removed = self.commit(|list| {
            let idx = position(list, id)?;
            Ok(list.remove(idx))
        })?;

        self.discard_image(removed.image()).await;
        tracing::info!("product deleted");
        Ok(removed)
    }

    /// Remove every listed product. Unknown ids are ignored.
    #[tracing::instrument(skip_all, fields(requested = ids.len()))]
    pub async fn delete_many(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
        let wanted: HashSet<&ProductId> = ids.iter().collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let removed = self.commit(|list| {
            let (removed, kept): (Vec<Product>, Vec<Product>) =
                list.drain(..).partition(|p| wanted.contains(p.id()));
            *list = kept;
            Ok(removed)
        })?;

        for product in &removed {
            self.discard_image(product.image()).await;
        }

        tracing::info!(removed = removed.len(), "products deleted");
        Ok(removed)
    }

    /// Remove everything, including the stored snapshot.
    #[tracing::instrument(skip_all)]
    pub async fn clear(&self) -> StoreResult<Vec<Product>> {
        let removed = {
            let mut guard = self.write();
            self.storage.clear()?;
            std::mem::take(&mut *guard)
        };

        for product in &removed {
            self.discard_image(product.image()).await;
        }

        tracing::info!(removed = removed.len(), "catalog cleared");
        Ok(removed)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Product>> {
        self.products.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Product>> {
        self.products.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `change` on a copy of the list, save it, then make it current.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut Vec<Product>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.write();
        let mut next = guard.clone();
        let out = change(&mut next)?;
        self.storage.save(&next)?;
        *guard = next;
        Ok(out)
    }

    async fn store_image(&self, id: &ProductId, upload: ImageUpload) -> StoreResult<String> {
        match &self.blobs {
            Some(blobs) => {
                let _loading = Loading::start(&self.in_flight);
                let key = upload.key_for(id, Uuid::now_v7());
                let content_type = upload.content_type().to_string();
                let url = blobs.put(&key, &content_type, upload.into_bytes()).await?;
                Ok(url)
            }
            None => Ok(upload.to_data_url()),
        }
    }

    /// Best-effort removal of a blob this store uploaded.
    async fn discard_image(&self, url: &str) {
        let Some(blobs) = &self.blobs else {
            return;
        };
        if !blobs.owns(url) {
            return;
        }

        let _loading = Loading::start(&self.in_flight);
        if let Err(err) = blobs.delete(url).await {
            tracing::warn!(%url, error = %err, "failed to delete product image");
        }
    }
}

fn position(list: &[Product], id: &ProductId) -> StoreResult<usize> {
    list.iter()
        .position(|p| p.id() == id)
        .ok_or_else(|| DomainError::not_found(format!("product {id}")).into())
}

/// Linear-scan uniqueness check of id and name. `skip` excludes the product's
/// own slot when it is already in `list`.
fn ensure_unique(list: &[Product], product: &Product, skip: Option<usize>) -> StoreResult<()> {
    for (idx, other) in list.iter().enumerate() {
        if Some(idx) == skip {
            continue;
        }
        if other.id() == product.id() {
            return Err(DomainError::conflict(format!(
                "a product with id {} already exists",
                product.id()
            ))
            .into());
        }
        if other.has_name(product.name()) {
            return Err(DomainError::conflict(format!(
                "a product named {:?} already exists",
                product.name()
            ))
            .into());
        }
    }
    Ok(())
}

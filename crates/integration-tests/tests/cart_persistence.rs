//! Carts survive across requests and store instances with file storage.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use shopfront_core::ProductId;
use shopfront_integration_tests::TestApp;
use shopfront_storefront::cart::{CartStore, FileStorage};
use shopfront_storefront::config::{CartConfig, CartStorageKind, StorefrontConfig};

#[tokio::test]
async fn test_file_storage_mirrors_cart() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorefrontConfig {
        cart: CartConfig {
            storage: CartStorageKind::File,
            dir: dir.path().to_path_buf(),
        },
        ..StorefrontConfig::default()
    };
    let mut app = TestApp::with_config(config);

    app.post_form("/cart/add", &[("id", "1")]).await;
    app.post_form("/cart/add", &[("id", "2"), ("quantity", "2")])
        .await;
    app.post_form("/cart/update", &[("id", "1"), ("quantity", "5")])
        .await;

    let storage = FileStorage::new(dir.path());
    let clients = storage.clients().unwrap();
    assert_eq!(clients.len(), 1);

    let store = CartStore::open(&storage, clients[0].clone()).unwrap();
    assert_eq!(store.total_items(), 7);
    assert_eq!(store.lines()[0].id, ProductId::new("1"));
    assert_eq!(store.lines()[0].quantity, 5);
    assert_eq!(store.lines()[1].quantity, 2);
    assert_eq!(store.total_price(), "1099.93".parse().unwrap());

    app.post_form("/cart/clear", &[]).await;
    assert!(storage.clients().unwrap().is_empty());
}

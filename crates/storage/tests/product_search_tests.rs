use std::sync::Arc;

use domain::commands::product_commands::{CreateProductRequest, ProductFilter};
use domain::Discount;
use mongodb::bson::{doc, Document};
use storage::document::{DocumentStore, MemoryDocumentStore, CATEGORIES, PRODUCTS, REVIEWS};
use storage::{CallContext, Storage, StorageError, StorageImpl};

fn storage_with(documents: &MemoryDocumentStore) -> StorageImpl {
    StorageImpl::new(
        Arc::new(documents.clone()),
        Arc::new(storage::kv::MemoryListStore::new()),
    )
}

fn product_doc(id: &str, name: &str, category_id: &str, price: f64, created_at: &str) -> Document {
    doc! {
        "_id": id,
        "category_id": category_id,
        "name": name,
        "description": "",
        "price": price,
        "stock": 10_i64,
        "images": [],
        "discount": { "status": false, "discount_price": 0.0 },
        "created_at": created_at,
        "updated_at": created_at,
        "deleted_at": "",
    }
}

fn category_doc(id: &str, name: &str) -> Document {
    doc! {
        "_id": id,
        "name": name,
        "description": "",
        "created_at": "2024-01-01 00:00:00",
        "updated_at": "2024-01-01 00:00:00",
        "deleted_at": "",
    }
}

fn review_doc(id: &str, product_id: &str, rating: i32, deleted_at: &str) -> Document {
    doc! {
        "_id": id,
        "product_id": product_id,
        "user_id": "u1",
        "rating": rating,
        "comment": "",
        "created_at": "2024-01-01 00:00:00",
        "updated_at": "2024-01-01 00:00:00",
        "deleted_at": deleted_at,
    }
}

fn ids(page: &domain::commands::product_commands::ProductPage) -> Vec<&str> {
    page.products.iter().map(|p| p.id.as_str()).collect()
}

fn draft(name: &str) -> CreateProductRequest {
    CreateProductRequest {
        category_id: "c1".to_string(),
        name: name.to_string(),
        description: "something to sell".to_string(),
        price: 19.5,
        stock: 4,
        images: vec!["front.png".to_string()],
        discount: Discount::default(),
    }
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let storage = StorageImpl::in_memory();
    let ctx = CallContext::background();

    let created = storage.products().create(&ctx, draft("Desk Lamp")).await.unwrap();
    assert!(created.success);

    let product = storage.products().get_by_id(&ctx, &created.id).await.unwrap();
    assert_eq!(product.name, "Desk Lamp");
    assert_eq!(product.description, "something to sell");
    assert_eq!(product.price, 19.5);
    assert_eq!(product.stock, 4);
    assert_eq!(product.images, vec!["front.png"]);
    assert!(product.deleted_at.is_none());
    assert_eq!(product.created_at, product.updated_at);
}

#[tokio::test]
async fn test_soft_delete_hides_product_everywhere() {
    let storage = StorageImpl::in_memory();
    let ctx = CallContext::background();
    let products = storage.products();

    let kept = products.create(&ctx, draft("Phone A")).await.unwrap();
    let gone = products.create(&ctx, draft("Phone B")).await.unwrap();

    let first = products.soft_delete(&ctx, &gone.id).await.unwrap();
    assert!(first.success);

    // Idempotent: second delete reports nothing to do instead of failing
    let second = products.soft_delete(&ctx, &gone.id).await.unwrap();
    assert!(!second.success);

    assert!(products.get_by_id(&ctx, &gone.id).await.unwrap_err().is_not_found());

    let filters = [
        ProductFilter::default(),
        ProductFilter {
            name: Some("phone".to_string()),
            ..Default::default()
        },
        ProductFilter {
            price_order: 1,
            rating_order: -1,
            comment_order: 1,
            newest_first: true,
            ..Default::default()
        },
    ];
    for filter in &filters {
        let page = products.search(&ctx, filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(ids(&page), vec![kept.id.as_str()]);
    }
}

#[tokio::test]
async fn test_name_search_counts_filtered_set() {
    let documents = MemoryDocumentStore::new();
    let coll = documents.collection(PRODUCTS);
    let names = [
        "Smartphone X", "Laptop", "Tablet", "PHONE case", "Monitor", "Keyboard", "Mouse",
        "Headphones", "Camera", "Speaker", "Charger", "Cable", "Router", "Printer", "Desk",
    ];
    for (i, name) in names.iter().enumerate() {
        coll.insert_one(product_doc(&format!("p{:02}", i), name, "c1", 10.0, "2024-01-01 00:00:00"))
            .await
            .unwrap();
    }

    let storage = storage_with(&documents);
    let filter = ProductFilter {
        name: Some("phone".to_string()),
        page: 1,
        limit: 10,
        ..Default::default()
    };
    let page = storage
        .products()
        .search(&CallContext::background(), &filter)
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.products.len(), 3);
    assert_eq!(page.limit, 10);
    assert_eq!(page.offset, 0);
}

#[tokio::test]
async fn test_total_is_independent_of_page() {
    let documents = MemoryDocumentStore::new();
    let coll = documents.collection(PRODUCTS);
    for i in 0..7 {
        coll.insert_one(product_doc(&format!("p{}", i), "Item", "c1", i as f64, "2024-01-01 00:00:00"))
            .await
            .unwrap();
    }
    let storage = storage_with(&documents);
    let ctx = CallContext::background();

    let mut seen = Vec::new();
    for page in 1..=4 {
        let filter = ProductFilter {
            page,
            limit: 2,
            ..Default::default()
        };
        let result = storage.products().search(&ctx, &filter).await.unwrap();
        assert_eq!(result.total, 7);
        assert_eq!(result.offset, (page - 1) * 2);
        seen.extend(result.products.into_iter().map(|p| p.id));
    }

    // Pages do not overlap and together cover every product
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 7);
}

#[tokio::test]
async fn test_category_and_discount_filters() {
    let documents = MemoryDocumentStore::new();
    let categories = documents.collection(CATEGORIES);
    categories.insert_one(category_doc("c1", "Electronics")).await.unwrap();
    categories.insert_one(category_doc("c2", "Books")).await.unwrap();

    let products = documents.collection(PRODUCTS);
    products
        .insert_one(product_doc("p1", "Phone", "c1", 100.0, "2024-01-01 00:00:00"))
        .await
        .unwrap();
    let mut discounted = product_doc("p2", "Tablet", "c1", 200.0, "2024-01-01 00:00:00");
    discounted.insert("discount", doc! { "status": true, "discount_price": 150.0 });
    products.insert_one(discounted).await.unwrap();
    products
        .insert_one(product_doc("p3", "Novel", "c2", 10.0, "2024-01-01 00:00:00"))
        .await
        .unwrap();
    products
        .insert_one(product_doc("p4", "Orphan", "missing", 5.0, "2024-01-01 00:00:00"))
        .await
        .unwrap();

    let storage = storage_with(&documents);
    let ctx = CallContext::background();

    let electronics = storage
        .products()
        .search(
            &ctx,
            &ProductFilter {
                category: Some("Electronics".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(electronics.total, 2);
    assert!(electronics
        .products
        .iter()
        .all(|p| p.category.as_ref().map(|c| c.name.as_str()) == Some("Electronics")));

    let deals = storage
        .products()
        .search(
            &ctx,
            &ProductFilter {
                category: Some("Electronics".to_string()),
                discount_only: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(&deals), vec!["p2"]);

    // Products without a category still show up unfiltered
    let everything = storage
        .products()
        .search(&ctx, &ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(everything.total, 4);
    let orphan = everything.products.iter().find(|p| p.id == "p4").unwrap();
    assert!(orphan.category.is_none());
}

#[tokio::test]
async fn test_newest_then_price_sort() {
    let documents = MemoryDocumentStore::new();
    let coll = documents.collection(PRODUCTS);
    coll.insert_one(product_doc("a", "A", "c1", 30.0, "2024-01-01 00:00:00")).await.unwrap();
    coll.insert_one(product_doc("b", "B", "c1", 20.0, "2024-03-01 00:00:00")).await.unwrap();
    coll.insert_one(product_doc("c", "C", "c1", 10.0, "2024-03-01 00:00:00")).await.unwrap();
    coll.insert_one(product_doc("d", "D", "c1", 40.0, "2024-02-01 00:00:00")).await.unwrap();

    let storage = storage_with(&documents);
    let ctx = CallContext::background();

    let newest = storage
        .products()
        .search(
            &ctx,
            &ProductFilter {
                newest_first: true,
                price_order: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(&newest), vec!["c", "b", "d", "a"]);

    let cheapest = storage
        .products()
        .search(
            &ctx,
            &ProductFilter {
                price_order: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(&cheapest), vec!["c", "b", "a", "d"]);
}

#[tokio::test]
async fn test_review_sorts_do_not_duplicate_products() {
    let documents = MemoryDocumentStore::new();
    let products = documents.collection(PRODUCTS);
    for id in ["p1", "p2", "p3"] {
        products
            .insert_one(product_doc(id, id, "c1", 1.0, "2024-01-01 00:00:00"))
            .await
            .unwrap();
    }

    let reviews = documents.collection(REVIEWS);
    reviews.insert_one(review_doc("r1", "p1", 5, "")).await.unwrap();
    reviews.insert_one(review_doc("r2", "p1", 5, "")).await.unwrap();
    reviews.insert_one(review_doc("r3", "p2", 1, "")).await.unwrap();
    reviews.insert_one(review_doc("r4", "p2", 2, "")).await.unwrap();
    reviews.insert_one(review_doc("r5", "p2", 3, "")).await.unwrap();
    // Deleted reviews neither count nor rate
    reviews
        .insert_one(review_doc("r6", "p3", 5, "2024-01-02 00:00:00"))
        .await
        .unwrap();

    let storage = storage_with(&documents);
    let ctx = CallContext::background();

    let by_rating = storage
        .products()
        .search(
            &ctx,
            &ProductFilter {
                rating_order: -1,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_rating.total, 3);
    assert_eq!(ids(&by_rating), vec!["p1", "p2", "p3"]);

    let by_comments = storage
        .products()
        .search(
            &ctx,
            &ProductFilter {
                comment_order: -1,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(&by_comments), vec!["p2", "p1", "p3"]);
}

#[tokio::test]
async fn test_zero_paging_uses_defaults() {
    let documents = MemoryDocumentStore::new();
    let coll = documents.collection(PRODUCTS);
    for i in 0..12 {
        coll.insert_one(product_doc(&format!("p{:02}", i), "Item", "c1", 1.0, "2024-01-01 00:00:00"))
            .await
            .unwrap();
    }
    let storage = storage_with(&documents);

    let page = storage
        .products()
        .search(&CallContext::background(), &ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 12);
    assert_eq!(page.products.len(), 10);
    assert_eq!(page.limit, 10);
}

#[tokio::test]
async fn test_recommendations_only_live_discounted() {
    let storage = StorageImpl::in_memory();
    let ctx = CallContext::background();
    let products = storage.products();

    let on_sale = |name: &str| CreateProductRequest {
        discount: Discount {
            active: true,
            discounted_price: 9.0,
        },
        ..draft(name)
    };

    let kept = products.create(&ctx, on_sale("Kettle")).await.unwrap();
    let withdrawn = products.create(&ctx, on_sale("Toaster")).await.unwrap();
    products.create(&ctx, draft("Blender")).await.unwrap();
    products.soft_delete(&ctx, &withdrawn.id).await.unwrap();

    let recommended = products.recommendations(&ctx).await.unwrap();
    assert_eq!(recommended.len(), 1);
    assert_eq!(recommended[0].id, kept.id);
    assert!(recommended[0].discount.active);
    assert_eq!(recommended[0].discount.discounted_price, 9.0);
}

#[tokio::test]
async fn test_deleted_category_is_not_joined() {
    let documents = MemoryDocumentStore::new();
    documents
        .collection(CATEGORIES)
        .insert_one(category_doc("c1", "Electronics"))
        .await
        .unwrap();
    documents
        .collection(PRODUCTS)
        .insert_one(product_doc("p1", "Phone", "c1", 100.0, "2024-01-01 00:00:00"))
        .await
        .unwrap();

    let storage = storage_with(&documents);
    let ctx = CallContext::background();
    assert!(storage.categories().delete(&ctx, "c1").await.unwrap().success);

    let electronics = storage
        .products()
        .search(
            &ctx,
            &ProductFilter {
                category: Some("Electronics".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(electronics.total, 0);
    assert!(electronics.products.is_empty());

    // The product itself stays visible, just without its category
    let everything = storage
        .products()
        .search(&ctx, &ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(ids(&everything), vec!["p1"]);
    assert!(everything.products[0].category.is_none());
}

#[tokio::test]
async fn test_page_beyond_range_is_rejected() {
    let storage = StorageImpl::in_memory();
    let filter = ProductFilter {
        page: i64::MAX,
        limit: 10,
        ..Default::default()
    };

    let err = storage
        .products()
        .search(&CallContext::background(), &filter)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
}

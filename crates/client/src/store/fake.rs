//! In-memory catalog service for store tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rust_decimal::Decimal;
use vitrine_core::{
    Category, ListQuery, ListSelector, Price, Product, ProductDraft, ProductId, ProductPage,
};

use crate::remote::{CatalogApi, CatalogError, UpdateOutcome};

pub const BASE_URL: &str = "https://catalog.test";

/// A catalog service that, like the public demo services, accepts writes
/// without persisting them.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    pub products: Mutex<Vec<Product>>,
    pub categories: Mutex<Vec<Category>>,
    /// Every call made, e.g. `list:search:shoe`, `get:5`.
    pub calls: Mutex<Vec<String>>,
    /// IDs handed out by successive creates; defaults to 101, 102, ...
    pub create_ids: Mutex<VecDeque<i64>>,
    pub list_delays: Mutex<HashMap<ListSelector, Duration>>,
    pub offline: AtomicBool,
}

impl FakeCatalog {
    pub fn with_products(count: i64, category: &str) -> Self {
        let fake = Self::default();
        *fake.products.lock().unwrap() = (1..=count)
            .map(|id| product(id, &format!("Product {id}"), category))
            .collect();
        *fake.categories.lock().unwrap() = vec![
            Category::from_label(category, BASE_URL),
            Category::from_label("smartphones", BASE_URL),
        ];
        fake
    }

    pub fn delay_list(&self, selector: ListSelector, delay: Duration) {
        self.list_delays.lock().unwrap().insert(selector, delay);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_online(&self) -> Result<(), CatalogError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CatalogError::Server {
                status: 503,
                body: "service unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

pub fn product(id: i64, title: &str, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Price::new(Decimal::new(1999, 2)),
        description: String::new(),
        category: category.to_string(),
        images: vec![],
    }
}

fn selector_label(selector: &ListSelector) -> String {
    match selector {
        ListSelector::All => "all".to_string(),
        ListSelector::Search(term) => format!("search:{term}"),
        ListSelector::Category(slug) => format!("category:{slug}"),
    }
}

impl CatalogApi for FakeCatalog {
    async fn list_products(&self, query: &ListQuery) -> Result<ProductPage, CatalogError> {
        self.record(format!("list:{}", selector_label(&query.selector)));
        let delay = self.list_delays.lock().unwrap().get(&query.selector).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;

        let matching: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| query.selector.matches(p))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let products = matching
            .into_iter()
            .skip(usize::try_from(query.skip).unwrap())
            .take(query.limit.get() as usize)
            .collect();

        Ok(ProductPage { products, total })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.record("categories".to_string());
        self.check_online()?;
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.record(format!("get:{id}"));
        self.check_online()?;
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
        self.record(format!("create:{}", draft.title));
        self.check_online()?;
        let created = self.call_count("create:") as i64;
        let id = self
            .create_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(100 + created);
        Ok(Product::from_draft(ProductId::new(id), draft.clone()))
    }

    async fn update_product(&self, product: &Product) -> Result<UpdateOutcome, CatalogError> {
        self.record(format!("update:{}", product.id));
        self.check_online()?;
        let mut products = self.products.lock().unwrap();
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(UpdateOutcome::Applied(product.clone()))
            }
            None => Ok(UpdateOutcome::Missing),
        }
    }

    async fn delete_product(&self, id: ProductId) -> Result<ProductId, CatalogError> {
        self.record(format!("delete:{id}"));
        self.check_online()?;
        self.products.lock().unwrap().retain(|p| p.id != id);
        Ok(id)
    }
}

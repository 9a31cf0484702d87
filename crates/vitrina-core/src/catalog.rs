use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::error::CatalogError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    /// Price in cents, so it can never go negative.
    pub price_cents: u64,
    pub category: String,
    pub description: String,
    pub stock_count: u32,
    pub offer: String,
}

impl ProductRecord {
    /// Price as shown to the user, e.g. `$89.90`
    pub fn display_price(&self) -> String {
        format_price(self.price_cents)
    }
}

/// Format an amount in cents with exactly two decimals.
pub fn format_price(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Fixed, ordered set of products available for lookup.
///
/// Iteration order is insertion order and is part of the contract: listings
/// and product matching both walk the catalog front to back.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<ProductRecord>,
    index_by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(products: Vec<ProductRecord>) -> Result<Self, CatalogError> {
        let mut index_by_id = HashMap::with_capacity(products.len());

        for (i, product) in products.iter().enumerate() {
            if product.id.trim().is_empty() {
                return Err(CatalogError::EmptyField {
                    id: product.id.clone(),
                    field: "id",
                });
            }
            // A blank name would be a substring of every message
            if product.name.trim().is_empty() {
                return Err(CatalogError::EmptyField {
                    id: product.id.clone(),
                    field: "name",
                });
            }
            if index_by_id.insert(product.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId {
                    id: product.id.clone(),
                });
            }
        }

        Ok(Self {
            products,
            index_by_id,
        })
    }

    /// The compiled-in store inventory.
    pub fn builtin() -> Self {
        let products = vec![
            ProductRecord {
                id: "001".to_string(),
                name: "Auriculares Bluetooth".to_string(),
                price_cents: 8990,
                category: "Tecnología".to_string(),
                description: "Auriculares con cancelación de ruido y batería de 20h.".to_string(),
                stock_count: 10,
                offer: "10% de descuento por lanzamiento".to_string(),
            },
            ProductRecord {
                id: "002".to_string(),
                name: "Zapatillas deportivas".to_string(),
                price_cents: 12900,
                category: "Calzado".to_string(),
                description: "Zapatillas resistentes para entrenamiento diario.".to_string(),
                stock_count: 5,
                offer: "Compra 1 y llévate medias gratis".to_string(),
            },
            ProductRecord {
                id: "003".to_string(),
                name: "Mochila Ejecutiva".to_string(),
                price_cents: 14950,
                category: "Accesorios".to_string(),
                description: "Diseño impermeable y acolchado para laptops de hasta 17''.".to_string(),
                stock_count: 3,
                offer: "Envío gratis por tiempo limitado".to_string(),
            },
        ];

        let index_by_id = products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        Self {
            products,
            index_by_id,
        }
    }

    pub fn lookup_all(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&ProductRecord> {
        self.index_by_id.get(id).and_then(|&i| self.products.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

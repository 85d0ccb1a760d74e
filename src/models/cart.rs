use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Product, ProductId};

/// Ordered list of products in the shopping cart
///
/// Serializes as a bare JSON array, which is exactly the value kept in the
/// durable storage slot. Insertion order is the order products were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Product>", from = "Vec<Product>")]
pub struct Cart {
    products: Vec<Product>,
}

/// Line item view with its computed subtotal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemResponse {
    #[serde(flatten)]
    pub product: Product,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

/// Response model for cart reads and mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub line_items: usize,
    pub total_units: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Number of distinct products in the cart
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Total number of units across all lines
    pub fn total_units(&self) -> u64 {
        self.products
            .iter()
            .map(|product| u64::from(product.amount))
            .sum()
    }

    /// Total price of the cart
    pub fn total(&self) -> Decimal {
        self.products
            .iter()
            .map(Product::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// New cart with `product` appended at the end.
    ///
    /// A product whose id is already present replaces the existing line in
    /// place, so ids stay unique.
    pub fn with_product(&self, product: Product) -> Self {
        let mut products = self.products.clone();
        match products.iter_mut().find(|existing| existing.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Self { products }
    }

    /// New cart without the line for `product_id`. Absent ids are a no-op.
    pub fn without(&self, product_id: ProductId) -> Self {
        Self {
            products: self
                .products
                .iter()
                .filter(|product| product.id != product_id)
                .cloned()
                .collect(),
        }
    }

    /// New cart where the line for `product_id` carries `amount`.
    /// Every other line and the order are untouched.
    pub fn with_amount(&self, product_id: ProductId, amount: u32) -> Self {
        Self {
            products: self
                .products
                .iter()
                .map(|product| {
                    if product.id == product_id {
                        product.with_amount(amount)
                    } else {
                        product.clone()
                    }
                })
                .collect(),
        }
    }

    /// Build the response view of this cart
    pub fn to_response(&self) -> CartResponse {
        CartResponse {
            items: self
                .products
                .iter()
                .map(|product| CartItemResponse {
                    product: product.clone(),
                    subtotal: product.subtotal(),
                })
                .collect(),
            line_items: self.len(),
            total_units: self.total_units(),
            total: self.total(),
        }
    }
}

impl From<Vec<Product>> for Cart {
    /// Later duplicates of an id are dropped so the uniqueness invariant holds
    /// even for hand-edited storage contents.
    fn from(products: Vec<Product>) -> Self {
        products
            .into_iter()
            .fold(Cart::new(), |cart, product| {
                if cart.contains(product.id) {
                    cart
                } else {
                    let mut products = cart.products;
                    products.push(product);
                    Cart { products }
                }
            })
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.products
    }
}

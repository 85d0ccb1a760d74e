use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog identifier of a product
pub type ProductId = u64;

/// A catalog product as held in the cart
///
/// `amount` is the quantity of this product currently in the cart. Records
/// coming from the catalog may omit it; the store sets it when adding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    #[serde(default)]
    pub amount: u32,
}

/// Remote-reported available quantity for a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: ProductId,
    pub amount: u32,
}

/// Request to set the quantity of a product already in the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: u32,
}

impl Product {
    /// Price of this line: unit price times amount in cart, saturating at
    /// `Decimal::MAX`
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.amount))
    }

    /// Copy of this product with a different cart amount
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sneaker() -> Product {
        Product {
            id: 1,
            title: "Tênis de Caminhada Leve Confortável".to_string(),
            price: dec!(179.9),
            image: "https://cdn.example.com/sneaker-1.jpg".to_string(),
            amount: 2,
        }
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(sneaker().subtotal(), dec!(359.8));
        assert_eq!(sneaker().with_amount(0).subtotal(), dec!(0));
    }

    #[test]
    fn test_subtotal_saturates() {
        let product = Product {
            price: Decimal::MAX,
            ..sneaker().with_amount(u32::MAX)
        };

        assert_eq!(product.subtotal(), Decimal::MAX);
    }

    #[test]
    fn test_catalog_record_without_amount() {
        let json = r#"{"id": 3, "title": "Runner", "price": 139.9, "image": "runner.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, 3);
        assert_eq!(product.amount, 0);
        assert_eq!(product.price, dec!(139.9));
    }

    #[test]
    fn test_price_serialized_as_number() {
        let json = serde_json::to_value(sneaker()).unwrap();
        assert!(json["price"].is_number());
        assert_eq!(json["amount"], 2);
    }

    #[test]
    fn test_update_request_deserialization() {
        let json = r#"{"product_id": 4, "amount": 3}"#;
        let request: UpdateProductAmount = serde_json::from_str(json).unwrap();

        assert_eq!(request.product_id, 4);
        assert_eq!(request.amount, 3);
    }
}

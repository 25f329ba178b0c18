//! Sale wire mapping
//!
//! Field priority:
//!
//! | Field          | Accepted keys                                              |
//! |----------------|------------------------------------------------------------|
//! | `id`           | `id`, `Id`, `ID`, `_id`                                    |
//! | `productId`    | `productId`, `product_id`, `ProductId`, `product.id`       |
//! | `sellerId`     | `sellerId`, `seller_id`, `SellerId`, `userId`, `seller.id` |
//! | `quantity`     | `quantity`, `Quantity`, `qty`                              |
//! | `totalPrice`   | `totalPrice`, `total_price`, `TotalPrice`, `total`         |
//! | `customerName` | `customerName`, `customer_name`, `CustomerName`, `customer` |

use serde_json::{Map, Value};

use stocksync_core::domain::{Entity, Sale, SaleDraft, SalePatch};

use crate::gateway::WireFormat;
use crate::normalize::{self, Object};
use crate::ApiError;

const PRODUCT_ID: &[&str] = &["productId", "product_id", "ProductId", "product.id"];
const SELLER_ID: &[&str] = &["sellerId", "seller_id", "SellerId", "userId", "seller.id"];
const QUANTITY: &[&str] = &["quantity", "Quantity", "qty"];
const TOTAL_PRICE: &[&str] = &["totalPrice", "total_price", "TotalPrice", "total"];
const CUSTOMER_NAME: &[&str] = &["customerName", "customer_name", "CustomerName", "customer"];

impl WireFormat for Sale {
    fn from_wire(obj: &Object) -> Result<Self, ApiError> {
        let meta = normalize::synced_meta(obj)?;
        let quantity = normalize::count_field(obj, QUANTITY)?.ok_or_else(|| {
            ApiError::InvalidResponse("sale without quantity".to_string())
        })?;
        let draft = SaleDraft {
            product_id: normalize::required_id(obj, PRODUCT_ID)?,
            seller_id: normalize::id_field(obj, SELLER_ID)?,
            quantity,
            total_price: normalize::amount_field(obj, TOTAL_PRICE)?.unwrap_or_default(),
            customer_name: normalize::text_field(obj, CUSTOMER_NAME),
        };
        Ok(Sale::from_parts(meta, draft))
    }

    /// `sellerId` is omitted when unknown; the server then attributes the
    /// sale to the authenticated caller
    fn create_body(draft: &SaleDraft) -> Value {
        let mut body = Map::new();
        body.insert("productId".into(), normalize::id_value(&draft.product_id));
        normalize::put_opt(
            &mut body,
            "sellerId",
            draft.seller_id.as_ref().map(normalize::id_value),
        );
        body.insert("quantity".into(), draft.quantity.into());
        body.insert("totalPrice".into(), draft.total_price.into());
        normalize::put_opt(&mut body, "customerName", draft.customer_name.clone());
        Value::Object(body)
    }

    fn update_body(patch: &SalePatch) -> Value {
        let mut body = Map::new();
        normalize::put_opt(&mut body, "customerName", patch.customer_name.clone());
        normalize::put_opt(&mut body, "totalPrice", patch.total_price);
        Value::Object(body)
    }
}

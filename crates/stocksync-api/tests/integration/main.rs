//! Integration tests for stocksync-api
//!
//! Uses wiremock to simulate the REST API and verifies end-to-end behavior
//! of the gateways: request shapes, response normalization and error
//! classification.


mod test_branches;
mod test_products;
mod test_sales;

/// Test fixtures and sample data for integration tests

/// Sample Ethereum addresses for testing
pub mod addresses {
    pub const VALID_WALLET_1: &str = "0x742d35Cc6634C0532925a3b8D8b5d0f8988Db8c7";
    pub const VALID_WALLET_2: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
    pub const MALFORMED_WALLET: &str = "0x123";
}

/// Sample balances as hex QUANTITY strings
pub mod balances {
    /// 1 ether
    pub const ONE_ETHER: &str = "0xde0b6b3a7640000";
    /// 2 ether
    pub const TWO_ETHER: &str = "0x1bc16d674ec80000";
    /// 10^30 wei
    pub const ONE_TRILLION_ETHER: &str = "0xc9f2c9cd04674edea40000000";
}

/// Sample upstream response bodies
pub mod responses {
    use serde_json::{json, Value};

    pub fn balance_result(hex: &str) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": hex
        })
    }

    pub fn balance_error(code: i64, message: &str) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": code, "message": message}
        })
    }

    pub fn quote(base: &str, quote: &str, price: Value) -> Value {
        json!({
            "status": {
                "timestamp": "2024-10-24T12:00:00.000Z",
                "error_code": 0,
                "error_message": null
            },
            "data": {
                base: {
                    "id": 1027,
                    "name": "Ethereum",
                    "symbol": base,
                    "quote": {
                        quote: {
                            "price": price,
                            "last_updated": "2024-10-24T12:00:00.000Z"
                        }
                    }
                }
            }
        })
    }

    pub fn quote_unauthorized() -> Value {
        json!({
            "status": {
                "error_code": 1001,
                "error_message": "This API Key is invalid."
            }
        })
    }
}

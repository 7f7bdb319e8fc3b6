//! Scripted JSON-RPC node for unit tests of the chain layer.
//!
//! Serves just enough of the `eth_` namespace for the client, the nonce
//! oracle and the submitter: a fixed chain (31337, head block 16, 1 gwei gas
//! price, 100k gas estimates) with a configurable relayer balance, account
//! nonce, `eth_call` outcome and receipt status.

use alloy::hex;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::sol_types::{Revert, SolError};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::blockchain::types::ChainConfig;

/// Head block; every receipt is mined here.
pub const HEAD_BLOCK: u64 = 16;

struct Script {
    balance: U256,
    account_nonce: u64,
    /// `Err(reason)` answers every `eth_call` with a revert.
    call_result: Result<Bytes, String>,
    mined_ok: bool,
    methods: Vec<String>,
    call_blocks: Vec<Value>,
    raw_transactions: Vec<Bytes>,
}

#[derive(Clone)]
pub struct RpcNode {
    script: Arc<Mutex<Script>>,
    url: String,
}

impl RpcNode {
    pub async fn start() -> Self {
        let script = Arc::new(Mutex::new(Script {
            balance: U256::from(10u128.pow(18)),
            account_nonce: 0,
            call_result: Ok(Bytes::new()),
            mined_ok: true,
            methods: Vec::new(),
            call_blocks: Vec::new(),
            raw_transactions: Vec::new(),
        }));

        let app = Router::new().route("/", post(handle)).with_state(script.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            script,
            url: format!("http://{}", addr),
        }
    }

    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            rpc_url: self.url.clone(),
            chain_id: 31337,
            rpc_timeout_secs: 2,
            poll_interval_ms: 10,
            ..ChainConfig::default()
        }
    }

    pub fn with_balance(self, wei: U256) -> Self {
        self.script.lock().unwrap().balance = wei;
        self
    }

    pub fn with_account_nonce(self, nonce: u64) -> Self {
        self.script.lock().unwrap().account_nonce = nonce;
        self
    }

    pub fn returning(self, data: impl Into<Bytes>) -> Self {
        self.script.lock().unwrap().call_result = Ok(data.into());
        self
    }

    pub fn reverting(self, reason: &str) -> Self {
        self.script.lock().unwrap().call_result = Err(reason.to_string());
        self
    }

    /// Receipts report `status: 0x0`.
    pub fn mining_reverted(self) -> Self {
        self.script.lock().unwrap().mined_ok = false;
        self
    }

    pub fn calls_of(&self, method: &str) -> usize {
        self.script
            .lock()
            .unwrap()
            .methods
            .iter()
            .filter(|m| *m == method)
            .count()
    }

    /// Block parameter of every `eth_call`, in order.
    pub fn call_blocks(&self) -> Vec<Value> {
        self.script.lock().unwrap().call_blocks.clone()
    }

    pub fn raw_transactions(&self) -> Vec<Bytes> {
        self.script.lock().unwrap().raw_transactions.clone()
    }
}

async fn handle(State(script): State<Arc<Mutex<Script>>>, Json(req): Json<Value>) -> Json<Value> {
    let id = req["id"].clone();
    let method = req["method"].as_str().unwrap_or_default().to_string();
    let params = req["params"].clone();

    let mut script = script.lock().unwrap();
    script.methods.push(method.clone());

    let outcome: Result<Value, Value> = match method.as_str() {
        "eth_chainId" => Ok(json!("0x7a69")),
        "eth_gasPrice" => Ok(json!("0x3b9aca00")),
        "eth_estimateGas" => Ok(json!("0x186a0")),
        "eth_blockNumber" => Ok(json!(format!("{:#x}", HEAD_BLOCK))),
        "eth_getBalance" => Ok(json!(script.balance)),
        "eth_getTransactionCount" => Ok(json!(U256::from(script.account_nonce))),
        "eth_call" => {
            script.call_blocks.push(params[1].clone());
            match &script.call_result {
                Ok(data) => Ok(json!(data)),
                Err(reason) => Err(json!({
                    "code": 3,
                    "message": format!("execution reverted: {}", reason),
                    "data": hex::encode_prefixed(Revert { reason: reason.clone() }.abi_encode()),
                })),
            }
        }
        "eth_sendRawTransaction" => {
            let raw: Bytes = serde_json::from_value(params[0].clone()).unwrap();
            let hash = keccak256(&raw);
            script.raw_transactions.push(raw);
            Ok(json!(hash))
        }
        "eth_getTransactionReceipt" => Ok(receipt(&params[0], script.mined_ok)),
        other => Err(json!({ "code": -32601, "message": format!("method {} not found", other) })),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(error) => json!({ "jsonrpc": "2.0", "id": id, "error": error }),
    })
}

fn receipt(tx_hash: &Value, success: bool) -> Value {
    json!({
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0x0b),
        "blockNumber": format!("{:#x}", HEAD_BLOCK),
        "from": Address::repeat_byte(0x01),
        "to": Address::repeat_byte(0xcc),
        "cumulativeGasUsed": "0x186a0",
        "gasUsed": "0x186a0",
        "effectiveGasPrice": "0x3b9aca00",
        "contractAddress": null,
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "type": "0x0",
        "status": if success { "0x1" } else { "0x0" },
    })
}

//! Configuration for the Avasara gateway
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::chain::{Address, Wei};

/// Registry contract on Open Campus Codex
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x2c26feff3e2c753f43de22beade3823154457246";

/// Avasara - registration gateway for the talent registry
#[derive(Parser, Debug, Clone)]
#[command(name = "avasara")]
#[command(about = "Registration gateway: profiles on IPFS, categories on-chain")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable development mode (in-process store and waitlist for any
    /// collaborator that is not configured)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Use the in-process ledger instead of the deployed contract
    /// (development mode only)
    #[arg(long, env = "LOCAL_LEDGER", default_value = "false")]
    pub local_ledger: bool,

    /// EVM JSON-RPC endpoint
    #[arg(long, env = "RPC_URL", default_value = "https://rpc.open-campus-codex.gelato.digital")]
    pub rpc_url: String,

    /// Chain ID reported to clients
    #[arg(long, env = "CHAIN_ID", default_value = "656476")]
    pub chain_id: u64,

    /// Registry contract address
    #[arg(long, env = "CONTRACT_ADDRESS", default_value = DEFAULT_CONTRACT_ADDRESS)]
    pub contract_address: String,

    /// Account that sends transactions when a request names none
    /// (must be unlocked on the node)
    #[arg(long, env = "SENDER_ADDRESS")]
    pub sender_address: Option<String>,

    /// Registration fee in wei (0.05 EDU)
    #[arg(long, env = "REGISTRATION_FEE_WEI", default_value = "50000000000000000")]
    pub registration_fee_wei: u128,

    /// Pinata JWT
    #[arg(long, env = "PINATA_JWT")]
    pub pinata_jwt: Option<String>,

    /// Pinata gateway domain
    #[arg(long, env = "PINATA_GATEWAY")]
    pub pinata_gateway: Option<String>,

    /// Pinata API base URL
    #[arg(long, env = "PINATA_API_URL", default_value = "https://api.pinata.cloud")]
    pub pinata_api_url: String,

    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN")]
    pub notion_token: Option<String>,

    /// Notion database receiving waitlist signups
    #[arg(long, env = "NOTION_DATABASE_ID")]
    pub notion_database_id: Option<String>,

    /// Notion API version header
    #[arg(long, env = "NOTION_API_VERSION", default_value = "2022-06-28")]
    pub notion_api_version: String,

    /// WalletConnect project ID handed to browser clients
    #[arg(long, env = "WALLETCONNECT_PROJECT_ID")]
    pub walletconnect_project_id: Option<String>,

    /// Timeout for outbound requests in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,
}

fn parse_address(name: &str, value: &Option<String>) -> Result<Option<Address>, String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            v.parse::<Address>()
                .map_err(|e| format!("{} is not a valid address: {}", name, e))
        })
        .transpose()
}

impl Args {
    /// Parsed contract address
    pub fn contract(&self) -> Result<Address, String> {
        self.contract_address
            .parse::<Address>()
            .map_err(|e| format!("CONTRACT_ADDRESS is not a valid address: {}", e))
    }

    /// Parsed default sender, if configured
    pub fn sender(&self) -> Result<Option<Address>, String> {
        parse_address("SENDER_ADDRESS", &self.sender_address)
    }

    pub fn registration_fee(&self) -> Wei {
        self.registration_fee_wei
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Pinata is usable when both the JWT and gateway are set
    pub fn pinata_configured(&self) -> bool {
        self.pinata_jwt.is_some() && self.pinata_gateway.is_some()
    }

    /// Notion is usable when both the token and database are set
    pub fn notion_configured(&self) -> bool {
        self.notion_token.is_some() && self.notion_database_id.is_some()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            if self.local_ledger {
                return Err("LOCAL_LEDGER is only allowed in development mode".to_string());
            }
            if !self.pinata_configured() {
                return Err(
                    "PINATA_JWT and PINATA_GATEWAY are required in production mode".to_string(),
                );
            }
            if !self.notion_configured() {
                return Err(
                    "NOTION_TOKEN and NOTION_DATABASE_ID are required in production mode"
                        .to_string(),
                );
            }
        }

        self.contract()?;
        self.sender()?;

        if self.registration_fee_wei == 0 {
            return Err("REGISTRATION_FEE_WEI must be greater than zero".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["avasara"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_dev_mode_needs_no_collaborators() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.registration_fee(), 50_000_000_000_000_000);
        assert_eq!(args.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_contract_address_defaults_to_deployed_registry() {
        let args = parse(&[]);
        assert_eq!(args.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(
            args.contract().unwrap().to_hex(),
            "0x2c26feff3e2c753f43de22beade3823154457246"
        );
        assert!(!args.local_ledger);

        let args = parse(&["--contract-address", "0x52908400098527886E0F7030069857D2E4169EE7"]);
        assert_eq!(
            args.contract().unwrap(),
            "0x52908400098527886e0f7030069857d2e4169ee7".parse().unwrap()
        );
    }

    #[test]
    fn test_production_requires_pinata_and_notion() {
        let args = Args {
            dev_mode: false,
            ..parse(&["--dev-mode"])
        };
        assert_eq!(
            args.validate(),
            Err("PINATA_JWT and PINATA_GATEWAY are required in production mode".to_string())
        );

        let args = Args {
            dev_mode: false,
            pinata_jwt: Some("jwt".into()),
            pinata_gateway: Some("example.mypinata.cloud".into()),
            notion_token: Some("secret".into()),
            ..parse(&["--dev-mode"])
        };
        assert!(!args.notion_configured());
        assert!(args.validate().unwrap_err().starts_with("NOTION_TOKEN"));
    }

    #[test]
    fn test_local_ledger_is_dev_only() {
        assert!(parse(&["--dev-mode", "--local-ledger"]).validate().is_ok());
        let args = Args {
            dev_mode: false,
            ..parse(&["--dev-mode", "--local-ledger"])
        };
        assert_eq!(
            args.validate(),
            Err("LOCAL_LEDGER is only allowed in development mode".to_string())
        );
    }

    #[test]
    fn test_production_fully_configured() {
        let args = Args {
            dev_mode: false,
            pinata_jwt: Some("jwt".into()),
            pinata_gateway: Some("example.mypinata.cloud".into()),
            notion_token: Some("secret".into()),
            notion_database_id: Some("db".into()),
            ..parse(&["--dev-mode"])
        };
        assert!(args.validate().is_ok());
        assert!(args.pinata_configured());
        assert!(args.notion_configured());
    }

    #[test]
    fn test_rejects_bad_address_and_zero_fee() {
        let args = Args {
            sender_address: Some("not-an-address".into()),
            ..parse(&["--dev-mode"])
        };
        assert!(args.validate().unwrap_err().starts_with("SENDER_ADDRESS"));

        let args = Args {
            contract_address: "0xnope".into(),
            ..parse(&["--dev-mode"])
        };
        assert!(args.validate().unwrap_err().starts_with("CONTRACT_ADDRESS"));

        let args = Args {
            registration_fee_wei: 0,
            ..parse(&["--dev-mode"])
        };
        assert!(args.validate().is_err());
    }
}

//! Static registry of supported networks, their stream contract and tokens.
//!
//! The table is fixed at build time; nothing here is runtime-configurable.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

// ─── Names and families ───────────────────────────────────────────────────────

/// The closed set of networks the client can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkName {
    CeloMainnet,
    CeloSepolia,
    ArcTestnet,
}

impl NetworkName {
    pub const ALL: [NetworkName; 3] = [Self::CeloMainnet, Self::CeloSepolia, Self::ArcTestnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CeloMainnet => "celo-mainnet",
            Self::CeloSepolia => "celo-sepolia",
            Self::ArcTestnet => "arc-testnet",
        }
    }

    /// The static descriptor for this network.
    pub fn descriptor(&self) -> &'static NetworkDescriptor {
        match self {
            Self::CeloMainnet => &CELO_MAINNET,
            Self::CeloSepolia => &CELO_SEPOLIA,
            Self::ArcTestnet => &ARC_TESTNET,
        }
    }

    /// Look a network up by its numeric chain id.
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|n| n.descriptor().chain_id == chain_id)
    }
}

impl Default for NetworkName {
    fn default() -> Self {
        Self::CeloSepolia
    }
}

impl fmt::Display for NetworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| format!("unknown network '{s}'"))
    }
}

/// Chain families, used to group networks in a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Celo,
    Arc,
}

impl ChainFamily {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Celo => "Celo",
            Self::Arc => "Arc",
        }
    }

    /// Networks of this family, in registry order.
    pub fn networks(&self) -> impl Iterator<Item = NetworkName> + '_ {
        NetworkName::ALL
            .into_iter()
            .filter(move |n| n.descriptor().family == *self)
    }
}

// ─── Tokens ───────────────────────────────────────────────────────────────────

/// Where a token lives: the chain's native currency or an ERC-20 contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenAddress {
    /// Paid by value transfer; encoded on-chain as the zero address.
    Native,
    Contract(Address),
}

impl TokenAddress {
    /// The address passed to the stream contract.
    pub fn on_chain(&self) -> Address {
        match self {
            Self::Native => Address::ZERO,
            Self::Contract(a) => *a,
        }
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Contract(a) => write!(f, "{a}"),
        }
    }
}

impl FromStr for TokenAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("native") {
            return Ok(Self::Native);
        }
        s.parse::<Address>()
            .map(Self::Contract)
            .map_err(|e| format!("invalid token address '{s}': {e}"))
    }
}

impl Serialize for TokenAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDescriptor {
    pub name: &'static str,
    pub address: TokenAddress,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<&'static str>,
}

impl TokenDescriptor {
    /// Display symbol, falling back to the token name.
    pub fn symbol(&self) -> &'static str {
        self.symbol.unwrap_or(self.name)
    }
}

// ─── Networks ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDescriptor {
    pub name: NetworkName,
    pub family: ChainFamily,
    pub chain_id: u64,
    pub display_name: &'static str,
    pub native_currency: NativeCurrency,
    pub rpc_urls: &'static [&'static str],
    pub explorer_urls: &'static [&'static str],
    /// Address of the deployed stream contract on this network.
    pub stream_contract: Address,
    /// Supported tokens, in display order.
    pub tokens: &'static [TokenDescriptor],
}

impl NetworkDescriptor {
    /// Chain id as the `0x`-prefixed hex quantity wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    /// Whether streams on this network may be paid in the native currency.
    pub fn supports_native_streams(&self) -> bool {
        self.tokens.iter().any(|t| t.address == TokenAddress::Native)
    }

    /// Find a supported token by address.
    pub fn token(&self, address: TokenAddress) -> Option<&'static TokenDescriptor> {
        self.tokens.iter().find(|t| t.address == address)
    }

    pub fn primary_rpc_url(&self) -> Option<&'static str> {
        self.rpc_urls.first().copied()
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_urls
            .first()
            .map(|base| format!("{}/tx/{tx_hash}", base.trim_end_matches('/')))
    }

    pub fn explorer_address_url(&self, address: &Address) -> Option<String> {
        self.explorer_urls
            .first()
            .map(|base| format!("{}/address/{address}", base.trim_end_matches('/')))
    }

    /// EIP-3085 parameters for `wallet_addEthereumChain`.
    pub fn add_chain_params(&self) -> Value {
        json!({
            "chainId": self.chain_id_hex(),
            "chainName": self.display_name,
            "nativeCurrency": {
                "name": self.native_currency.name,
                "symbol": self.native_currency.symbol,
                "decimals": self.native_currency.decimals,
            },
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.explorer_urls,
        })
    }
}

const CELO_NATIVE: NativeCurrency = NativeCurrency {
    name: "Celo",
    symbol: "CELO",
    decimals: 18,
};

const CELO_STREAM_CONTRACT: Address = address!("7Fb08DbfC487c33459cdE8cc5F2dda71Ceb7e4E4");

static CELO_MAINNET_TOKENS: [TokenDescriptor; 6] = [
    erc20("cUSD", address!("765de816845861e75a25fca122bb6898b8b1282a"), 18),
    erc20("cEUR", address!("d8763cba276a3738e6de85b4b3bf5fded6d6ca73"), 18),
    erc20("USDC", address!("cebA9300f2b948710d2653dD7B07f33A8B32118C"), 6),
    erc20("USDT", address!("48065fbBE25f71C9282ddf5e1cD6D6A887483D5e"), 6),
    erc20("WETH", address!("D221812de1BD094f35587EE8E174B07B6167D9Af"), 18),
    erc20("cREAL", address!("e8537a3d056DA446677B9E9d6c5dB704EaAb4787"), 18),
];

static CELO_SEPOLIA_TOKENS: [TokenDescriptor; 7] = [
    erc20("CELO", address!("471EcE3750Da237f93B8E339c536989b8978a438"), 18),
    erc20("cUSD", address!("EF4d55D6dE8e8d73232827Cd1e9b2F2dBb45bC80"), 18),
    erc20("cEUR", address!("6B172e333e2978484261D7eCC3DE491E79764BbC"), 18),
    erc20("USDC", address!("01C5C0122039549AD1493B8220cABEdD739BC44E"), 6),
    erc20("USDT", address!("d077A400968890Eacc75cdc901F0356c943e4fDb"), 6),
    erc20("WETH", address!("2cE73DC897A3E10b3FF3F86470847c36ddB735cf"), 18),
    erc20("cREAL", address!("13d68A1Bf4a8cB7d9feF54EF70401871b666269c"), 18),
];

// Native USDC is the gas token on Arc and uses 18 decimals at the value level.
static ARC_TESTNET_TOKENS: [TokenDescriptor; 1] = [TokenDescriptor {
    name: "USDC",
    address: TokenAddress::Native,
    decimals: 18,
    symbol: Some("USDC"),
}];

const fn erc20(name: &'static str, address: Address, decimals: u8) -> TokenDescriptor {
    TokenDescriptor {
        name,
        address: TokenAddress::Contract(address),
        decimals,
        symbol: None,
    }
}

pub static CELO_MAINNET: NetworkDescriptor = NetworkDescriptor {
    name: NetworkName::CeloMainnet,
    family: ChainFamily::Celo,
    chain_id: 42_220,
    display_name: "Celo Mainnet",
    native_currency: CELO_NATIVE,
    rpc_urls: &["https://forno.celo.org"],
    explorer_urls: &["https://celoscan.io"],
    stream_contract: CELO_STREAM_CONTRACT,
    tokens: &CELO_MAINNET_TOKENS,
};

pub static CELO_SEPOLIA: NetworkDescriptor = NetworkDescriptor {
    name: NetworkName::CeloSepolia,
    family: ChainFamily::Celo,
    chain_id: 11_142_220,
    display_name: "Celo Sepolia Testnet",
    native_currency: CELO_NATIVE,
    rpc_urls: &["https://forno.celo-sepolia.celo-testnet.org"],
    explorer_urls: &["https://celo-sepolia.blockscout.com"],
    stream_contract: CELO_STREAM_CONTRACT,
    tokens: &CELO_SEPOLIA_TOKENS,
};

pub static ARC_TESTNET: NetworkDescriptor = NetworkDescriptor {
    name: NetworkName::ArcTestnet,
    family: ChainFamily::Arc,
    chain_id: 5_042_002,
    display_name: "Arc Testnet",
    native_currency: NativeCurrency {
        name: "USDC",
        symbol: "USDC",
        decimals: 18,
    },
    rpc_urls: &[
        "https://rpc.testnet.arc.network",
        "https://rpc.blockdaemon.testnet.arc.network",
        "https://rpc.drpc.testnet.arc.network",
        "https://rpc.quicknode.testnet.arc.network",
    ],
    explorer_urls: &["https://testnet.arcscan.app"],
    stream_contract: address!("88B57d9DcF195EEAB0711cC274c7b80b7b2ba84a"),
    tokens: &ARC_TESTNET_TOKENS,
};

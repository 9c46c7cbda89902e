//! Typed bindings for the deployed stream contract and ERC-20 tokens.
//!
//! The stream contract's ABI is fixed by the deployment; only the subset the
//! client talks to is declared here.

use alloy_sol_types::{sol, SolCall};

use crate::error::AbiError;

sol! {
    #![sol(all_derives)]

    /// On-chain stream record as returned by `getStream`.
    #[sol(all_derives)]
    struct Stream {
        address sender;
        address recipient;
        address token;
        uint256 deposit;
        uint256 withdrawn;
        uint256 startTime;
        uint256 stopTime;
    }

    /// Entry of the per-address sender/recipient indexes.
    #[sol(all_derives)]
    struct StreamEntry {
        uint256 streamId;
        Stream stream;
    }

    /// `PaymentStream` as deployed at `0x7Fb08DbfC487c33459cdE8cc5F2dda71Ceb7e4E4`
    /// (Celo Mainnet and Celo Sepolia) and `0x88B57d9DcF195EEAB0711cC274c7b80b7b2ba84a`
    /// (Arc Testnet). Signatures and the `Stream` field order must match that
    /// bytecode; the tests below pin them.
    #[sol(all_derives)]
    interface IPaymentStream {
        event StreamCreated(
            uint256 indexed streamId,
            address indexed sender,
            address indexed recipient,
            address token,
            uint256 deposit,
            uint256 startTime,
            uint256 stopTime
        );

        function createStream(
            address recipient,
            address token,
            uint256 deposit,
            uint256 startTime,
            uint256 stopTime
        ) external payable returns (uint256 streamId);

        function getStream(uint256 streamId) external view returns (Stream memory);

        function withdrawableAmount(uint256 streamId) external view returns (uint256);

        function withdraw(uint256 streamId, uint256 amount) external;

        function cancelStream(uint256 streamId) external;

        function topUpStream(uint256 streamId, uint256 amount) external payable;

        function getSenderStreams(address sender) external view returns (StreamEntry[] memory);

        function getRecipientStreams(address recipient) external view returns (StreamEntry[] memory);
    }

    #[sol(all_derives)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address recipient, uint256 amount) external returns (bool);
        function transferFrom(address sender, address recipient, uint256 amount) external returns (bool);
    }
}

/// Decode the return data of call `C`, naming the function on failure.
pub fn decode_returns<C: SolCall>(data: &[u8]) -> Result<C::Return, AbiError> {
    C::abi_decode_returns(data).map_err(|e| AbiError::decode(C::SIGNATURE, e))
}

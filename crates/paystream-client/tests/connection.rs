mod common;

use std::time::Duration;

use paystream_core::{NetworkName, NotificationKind, StreamError};
use paystream_rpc::WalletEvent;

use common::{harness, ALICE, BOB};

#[tokio::test]
async fn connect_opens_session_on_matching_chain() {
    let h = harness(NetworkName::CeloSepolia);
    let session = h.manager.connect().await.unwrap();

    assert_eq!(session.account, ALICE);
    assert_eq!(session.chain_id, 11_142_220);
    assert!(h.manager.is_connected());
    assert_eq!(
        h.notifier.last(),
        Some(("Wallet connected successfully!".to_string(), NotificationKind::Success))
    );
    assert_eq!(h.wallet.log(), vec!["eth_requestAccounts", "eth_chainId"]);
}

#[tokio::test]
async fn connect_on_wrong_chain_keeps_no_state() {
    let h = harness(NetworkName::CeloSepolia);
    h.wallet.with(|s| s.chain_id = 42_220);

    let err = h.manager.connect().await.unwrap_err();
    assert_eq!(
        err,
        StreamError::WrongNetwork {
            expected: 11_142_220,
            actual: 42_220
        }
    );
    assert!(!h.manager.is_connected());
    assert_eq!(h.manager.network(), NetworkName::CeloSepolia);
    assert_eq!(
        h.notifier.last(),
        Some((
            "Please switch your wallet to Celo Sepolia Testnet.".to_string(),
            NotificationKind::Error
        ))
    );
}

#[tokio::test]
async fn connect_rejected_by_user() {
    let h = harness(NetworkName::CeloSepolia);
    h.wallet.with(|s| s.reject.insert("eth_requestAccounts".into()));

    let err = h.manager.connect().await.unwrap_err();
    assert!(matches!(err, StreamError::UserRejected(_)));
    assert!(!h.manager.is_connected());
    assert_eq!(h.notifier.last().unwrap().1, NotificationKind::Error);
}

#[tokio::test]
async fn switch_to_known_chain_clears_session() {
    let h = harness(NetworkName::CeloSepolia);
    h.manager.connect().await.unwrap();
    h.wallet.clear_log();

    h.manager.switch_network(NetworkName::CeloMainnet).await.unwrap();

    assert_eq!(h.manager.network(), NetworkName::CeloMainnet);
    assert!(!h.manager.is_connected());
    assert_eq!(h.wallet.log(), vec!["wallet_switchEthereumChain"]);
    assert_eq!(
        h.notifier.last(),
        Some((
            "Switched to Celo Mainnet. Please reconnect wallet.".to_string(),
            NotificationKind::Success
        ))
    );

    // reconnecting now targets the new network
    let session = h.manager.connect().await.unwrap();
    assert_eq!(session.chain_id, 42_220);
}

#[tokio::test]
async fn unknown_chain_is_added_before_switching() {
    let h = harness(NetworkName::CeloSepolia);
    h.manager.connect().await.unwrap();
    h.wallet.clear_log();

    h.manager.switch_network(NetworkName::ArcTestnet).await.unwrap();

    assert_eq!(
        h.wallet.log(),
        vec![
            "wallet_switchEthereumChain",
            "wallet_addEthereumChain",
            "wallet_switchEthereumChain"
        ]
    );
    assert_eq!(h.manager.network(), NetworkName::ArcTestnet);
    assert!(!h.manager.is_connected());
    assert_eq!(h.wallet.with(|s| s.chain_id), 5_042_002);
    assert!(h
        .notifier
        .last()
        .unwrap()
        .0
        .starts_with("Added and switched to Arc Testnet"));
}

#[tokio::test]
async fn rejected_switch_leaves_state_unchanged() {
    let h = harness(NetworkName::CeloSepolia);
    h.manager.connect().await.unwrap();
    h.wallet.with(|s| s.reject.insert("wallet_switchEthereumChain".into()));
    let before = h.manager.state();

    let err = h.manager.switch_network(NetworkName::CeloMainnet).await.unwrap_err();

    assert!(matches!(err, StreamError::UserRejected(_)));
    assert_eq!(h.manager.state(), before);
    assert_eq!(
        h.notifier.last(),
        Some(("Failed to switch to Celo Mainnet.".to_string(), NotificationKind::Error))
    );
}

#[tokio::test]
async fn rejected_add_chain_leaves_state_unchanged() {
    let h = harness(NetworkName::CeloSepolia);
    h.manager.connect().await.unwrap();
    h.wallet.with(|s| s.reject.insert("wallet_addEthereumChain".into()));
    let before = h.manager.state();

    assert!(h.manager.switch_network(NetworkName::ArcTestnet).await.is_err());

    assert_eq!(h.manager.state(), before);
    assert_eq!(
        h.notifier.last(),
        Some(("Failed to add Arc Testnet.".to_string(), NotificationKind::Error))
    );
}

#[tokio::test]
async fn empty_accounts_event_disconnects() {
    let h = harness(NetworkName::CeloSepolia);
    h.manager.connect().await.unwrap();

    h.manager
        .handle_wallet_event(WalletEvent::AccountsChanged(vec![]))
        .await;

    assert!(!h.manager.is_connected());
    assert_eq!(
        h.notifier.last(),
        Some(("Wallet disconnected.".to_string(), NotificationKind::Success))
    );
}

#[tokio::test]
async fn account_change_reconnects_with_new_account() {
    let h = harness(NetworkName::CeloSepolia);
    h.manager.connect().await.unwrap();
    h.wallet.with(|s| s.accounts = vec![BOB]);

    h.manager
        .handle_wallet_event(WalletEvent::AccountsChanged(vec![BOB.to_string()]))
        .await;

    assert_eq!(h.manager.session().unwrap().account, BOB);
}

#[tokio::test]
async fn failed_reconnect_after_account_change_drops_the_old_session() {
    let h = harness(NetworkName::CeloSepolia);
    h.manager.connect().await.unwrap();
    h.wallet.with(|s| {
        s.accounts = vec![BOB];
        s.reject.insert("eth_requestAccounts".into());
    });

    h.manager
        .handle_wallet_event(WalletEvent::AccountsChanged(vec![BOB.to_string()]))
        .await;

    assert!(!h.manager.is_connected());
    assert!(h.manager.session().is_none());
    assert_eq!(h.notifier.last().map(|(_, kind)| kind), Some(NotificationKind::Error));
}

#[tokio::test]
async fn listener_forwards_wallet_events() {
    let h = harness(NetworkName::CeloSepolia);
    h.manager.connect().await.unwrap();
    let mut rx = h.manager.subscribe();
    let task = h.manager.listen().unwrap();

    h.wallet.emit(WalletEvent::AccountsChanged(vec![]));

    tokio::time::timeout(Duration::from_secs(2), async {
        while rx.borrow_and_update().is_connected() {
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap();
    assert!(!h.manager.is_connected());
    task.abort();
}

#[tokio::test]
async fn subscribers_see_connection_changes() {
    let h = harness(NetworkName::CeloSepolia);
    let mut rx = h.manager.subscribe();
    assert!(!rx.borrow_and_update().is_connected());

    h.manager.connect().await.unwrap();

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.account(), Some(ALICE));
    assert!(!state.busy);
}

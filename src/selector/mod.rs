//! Account selector engine.
//!
//! Resolves persisted scene selections into fully described active accounts,
//! keeps coupled scenes reconciled with home, synchronizes the network-scoped
//! global derive type, and builds the grouped account list for the selector
//! UI. Every lookup is independently fault isolated: a missing entity
//! degrades that part of the result instead of failing the whole resolution.

pub mod accounts_list;
pub mod derive_type;
pub mod events;
pub mod reconciler;
pub mod resolver;
pub mod scene;
pub mod types;

pub use accounts_list::{
    AccountsListBuilder, AccountsListData, AccountsListItem, AccountsListSection,
    FocusedWalletInfo,
};
pub use derive_type::DeriveTypeSync;
pub use events::{EventDispatcher, SelectorEvent, SelectorEventHandler};
pub use reconciler::{SelectionReconciler, build_merged_selected_account};
pub use resolver::{ActiveAccountResolver, ResolvedSelection};
pub use scene::{SceneSyncPolicy, is_scene_using_global_derive_type};
pub use types::{
    ActiveAccountInfo, FocusedWallet, SceneId, SceneName, SelectedAccount, SelectedAccountsMap,
};

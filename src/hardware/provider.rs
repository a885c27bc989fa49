//! Positioning provider capability and the fix callback it drives

use crate::core::{FixRecord, SubscriptionId};
use crate::hardware::ProviderResult;
use crate::policy::RequestDescriptor;
use std::fmt;
use std::sync::Arc;

/// One fix tagged with the subscription that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixDelivery {
    pub subscription: SubscriptionId,
    pub fix: FixRecord,
}

/// Destination for deliveries; typically posts into the session's channel
pub type FixRoute = Arc<dyn Fn(FixDelivery) + Send + Sync>;

/// Callback handed to a provider with each subscription.
///
/// Cheap to clone so providers can move it onto their own delivery thread.
#[derive(Clone)]
pub struct FixCallback {
    subscription: SubscriptionId,
    route: FixRoute,
}

impl FixCallback {
    pub fn new(subscription: SubscriptionId, route: FixRoute) -> Self {
        Self { subscription, route }
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Hands a fix to the session; never blocks on session state
    pub fn deliver(&self, fix: FixRecord) {
        (self.route)(FixDelivery {
            subscription: self.subscription,
            fix,
        });
    }
}

impl fmt::Debug for FixCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixCallback")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

/// Abstraction over the platform positioning service
pub trait LocationProvider: Send {
    /// Subscribe to fixes matching `request`, delivered through `callback`.
    ///
    /// Returns `PermissionDenied` when the process is not authorized.
    fn request_updates(
        &mut self,
        request: &RequestDescriptor,
        callback: FixCallback,
    ) -> ProviderResult<()>;

    /// Cancel the live subscription.
    ///
    /// Returns `NoActiveSubscription` when nothing was subscribed. Must not
    /// wait for in-flight deliveries to drain.
    fn remove_updates(&mut self) -> ProviderResult<()>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "location-provider"
    }
}

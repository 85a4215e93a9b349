//! Service Container - Centralized service access.
//!
//! Handlers depend on the `ServiceContainer` trait, never on the concrete
//! managers, so API tests can swap in `MockServiceContainer`.

use std::sync::Arc;

use super::{
    AccountManager, AccountService, CartManager, CartService, CatalogManager, CatalogService,
    CheckoutManager, CheckoutService, EarningsManager, EarningsService, EventDispatcher,
    ProgressManager, ProgressService, QuizManager, QuizService, RatingManager, RatingService,
};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn accounts(&self) -> Arc<dyn AccountService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn checkout(&self) -> Arc<dyn CheckoutService>;

    fn quiz(&self) -> Arc<dyn QuizService>;

    fn progress(&self) -> Arc<dyn ProgressService>;

    fn ratings(&self) -> Arc<dyn RatingService>;

    fn earnings(&self) -> Arc<dyn EarningsService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    account_service: Arc<dyn AccountService>,
    catalog_service: Arc<dyn CatalogService>,
    cart_service: Arc<dyn CartService>,
    checkout_service: Arc<dyn CheckoutService>,
    quiz_service: Arc<dyn QuizService>,
    progress_service: Arc<dyn ProgressService>,
    rating_service: Arc<dyn RatingService>,
    earnings_service: Arc<dyn EarningsService>,
}

impl Services {
    /// Create service container from database connection and config.
    ///
    /// Every service shares one `Persistence`; events go through `dispatcher`.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: &Config,
        dispatcher: EventDispatcher,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let deduction = config.default_deduction_percentage;

        Self {
            account_service: Arc::new(AccountManager::new(uow.clone())),
            catalog_service: Arc::new(CatalogManager::new(uow.clone(), dispatcher.clone())),
            cart_service: Arc::new(CartManager::new(uow.clone())),
            checkout_service: Arc::new(CheckoutManager::new(
                uow.clone(),
                dispatcher.clone(),
                config.payment_policy,
                deduction,
            )),
            quiz_service: Arc::new(QuizManager::new(uow.clone())),
            progress_service: Arc::new(ProgressManager::new(uow.clone(), dispatcher)),
            rating_service: Arc::new(RatingManager::new(uow.clone())),
            earnings_service: Arc::new(EarningsManager::new(uow, deduction)),
        }
    }
}

impl ServiceContainer for Services {
    fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn checkout(&self) -> Arc<dyn CheckoutService> {
        self.checkout_service.clone()
    }

    fn quiz(&self) -> Arc<dyn QuizService> {
        self.quiz_service.clone()
    }

    fn progress(&self) -> Arc<dyn ProgressService> {
        self.progress_service.clone()
    }

    fn ratings(&self) -> Arc<dyn RatingService> {
        self.rating_service.clone()
    }

    fn earnings(&self) -> Arc<dyn EarningsService> {
        self.earnings_service.clone()
    }
}

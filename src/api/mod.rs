// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API router and request-tracking middleware.
//!
//! Middleware order on the request path: CORS, request tracking, rate
//! limiter, route guard, handler. The guard rejects before any request
//! body is read, and the tracker logs every outcome (guard and limiter
//! rejections included), attributing it through the `CurrentUser` the
//! guard echoes into the response extensions.

use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{route_guard, CurrentUser, Role};
use crate::rate_limit::rate_limit;
use crate::response::PageMeta;
use crate::state::AppState;
use crate::storage::{
    AssetType, BasketComposition, Country, Currency, DocumentType, EconomicIndicator,
    ExchangeRate, IndicatorKind, KycDocument, KycStatus, NewsArticle, NewsCategory,
    ProfileResponse, Reserve, ReserveTransaction, ReserveTxKind, ReserveTxStatus, ReviewStatus,
    RoleRecord, TransactionRecord, TxKind, TxStatus, WalletResponse,
};
use crate::validate::FieldError;

pub mod admin;
pub mod auth;
pub mod countries;
pub mod currencies;
pub mod economic_indicators;
pub mod exchange_rates;
pub mod health;
pub mod kyc;
pub mod news;
pub mod news_categories;
pub mod reserves;
pub mod roles;
pub mod transactions;
pub mod users;
pub mod wallets;

/// Log one line per request: method, path, user (when resolved), status
/// and duration. Sits outside the guard and the limiter so rejected
/// requests are logged too; the guard echoes [`CurrentUser`] into the
/// response extensions for attribution.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let user_id = response.extensions().get::<CurrentUser>().map(|u| u.id);
    tracing::info!(
        %method,
        %path,
        user_id = ?user_id,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    response
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        // Auth
        .route("/auth/login", post(auth::login))
        // Users
        .route("/users/me", get(users::me))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Wallets
        .route(
            "/wallets",
            get(wallets::list_wallets).post(wallets::create_wallet),
        )
        .route(
            "/wallets/{id}",
            get(wallets::get_wallet).delete(wallets::delete_wallet),
        )
        .route("/wallets/{id}/activate", put(wallets::activate_wallet))
        .route("/wallets/{id}/deactivate", put(wallets::deactivate_wallet))
        // Transactions
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get_transaction)
                .put(transactions::update_transaction)
                .delete(transactions::delete_transaction),
        )
        .route(
            "/transactions/{id}/process",
            post(transactions::process_transaction),
        )
        // KYC
        .route("/kyc", get(kyc::list_documents).post(kyc::submit_document))
        .route("/kyc/pending", get(kyc::pending_documents))
        .route("/kyc/{id}/approve", post(kyc::approve_document))
        .route("/kyc/{id}/reject", post(kyc::reject_document))
        // Roles
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
        .route("/roles/{id}/permissions", post(roles::add_permission))
        .route(
            "/roles/{id}/permissions/{permission}",
            delete(roles::remove_permission),
        )
        // Currencies
        .route(
            "/currencies",
            get(currencies::list_currencies).post(currencies::create_currency),
        )
        .route(
            "/currencies/{id}",
            get(currencies::get_currency)
                .put(currencies::update_currency)
                .delete(currencies::delete_currency),
        )
        // Countries
        .route(
            "/countries",
            get(countries::list_countries).post(countries::create_country),
        )
        .route(
            "/countries/{id}",
            get(countries::get_country)
                .put(countries::update_country)
                .delete(countries::delete_country),
        )
        // Exchange rates
        .route(
            "/exchange-rates",
            get(exchange_rates::list_rates).post(exchange_rates::upsert_rate),
        )
        .route("/exchange-rates/convert", get(exchange_rates::convert))
        .route("/exchange-rates/{id}", delete(exchange_rates::delete_rate))
        // Reserves
        .route(
            "/reserves",
            get(reserves::list_reserves).post(reserves::create_reserve),
        )
        .route(
            "/reserves/transactions",
            get(reserves::list_reserve_transactions).post(reserves::create_reserve_transaction),
        )
        .route(
            "/reserves/transactions/{id}/status",
            put(reserves::update_reserve_transaction_status),
        )
        .route(
            "/reserves/basket",
            get(reserves::current_basket).post(reserves::create_basket),
        )
        .route("/reserves/basket/history", get(reserves::basket_history))
        .route(
            "/reserves/{id}",
            get(reserves::get_reserve).put(reserves::update_reserve),
        )
        // News categories
        .route(
            "/news-categories",
            get(news_categories::list_categories).post(news_categories::create_category),
        )
        .route(
            "/news-categories/{id}",
            get(news_categories::get_category)
                .put(news_categories::update_category)
                .delete(news_categories::delete_category),
        )
        // News
        .route("/news", get(news::list_news).post(news::create_news))
        .route(
            "/news/{id}",
            get(news::get_news)
                .put(news::update_news)
                .delete(news::delete_news),
        )
        .route("/news/{id}/publish", post(news::publish_news))
        .route("/news/{id}/unpublish", post(news::unpublish_news))
        // Economic indicators
        .route(
            "/economic-indicators",
            get(economic_indicators::list_indicators).post(economic_indicators::create_indicator),
        )
        .route(
            "/economic-indicators/{id}",
            get(economic_indicators::get_indicator)
                .put(economic_indicators::update_indicator)
                .delete(economic_indicators::delete_indicator),
        )
        // Admin
        .route("/admin/stats", get(admin::platform_stats))
        .route("/admin/users/{id}/activity", get(admin::user_activity))
        .route("/admin/users/{id}/suspend", post(admin::suspend_user))
        .route("/admin/users/{id}/activate", post(admin::activate_user));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Innermost first: the guard runs before any body read, the
        // limiter sees everything, and the tracker outside both logs
        // rejected requests as well as handled ones.
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(middleware::from_fn(track_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::live,
        health::ready,
        auth::login,
        users::me,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        wallets::list_wallets,
        wallets::create_wallet,
        wallets::get_wallet,
        wallets::activate_wallet,
        wallets::deactivate_wallet,
        wallets::delete_wallet,
        transactions::list_transactions,
        transactions::create_transaction,
        transactions::get_transaction,
        transactions::update_transaction,
        transactions::delete_transaction,
        transactions::process_transaction,
        kyc::submit_document,
        kyc::list_documents,
        kyc::pending_documents,
        kyc::approve_document,
        kyc::reject_document,
        roles::list_roles,
        roles::create_role,
        roles::get_role,
        roles::update_role,
        roles::delete_role,
        roles::add_permission,
        roles::remove_permission,
        currencies::list_currencies,
        currencies::create_currency,
        currencies::get_currency,
        currencies::update_currency,
        currencies::delete_currency,
        countries::list_countries,
        countries::create_country,
        countries::get_country,
        countries::update_country,
        countries::delete_country,
        exchange_rates::list_rates,
        exchange_rates::upsert_rate,
        exchange_rates::convert,
        exchange_rates::delete_rate,
        reserves::list_reserves,
        reserves::create_reserve,
        reserves::get_reserve,
        reserves::update_reserve,
        reserves::list_reserve_transactions,
        reserves::create_reserve_transaction,
        reserves::update_reserve_transaction_status,
        reserves::current_basket,
        reserves::basket_history,
        reserves::create_basket,
        news_categories::list_categories,
        news_categories::create_category,
        news_categories::get_category,
        news_categories::update_category,
        news_categories::delete_category,
        news::list_news,
        news::create_news,
        news::get_news,
        news::update_news,
        news::publish_news,
        news::unpublish_news,
        news::delete_news,
        economic_indicators::list_indicators,
        economic_indicators::create_indicator,
        economic_indicators::get_indicator,
        economic_indicators::update_indicator,
        economic_indicators::delete_indicator,
        admin::platform_stats,
        admin::user_activity,
        admin::suspend_user,
        admin::activate_user
    ),
    components(
        schemas(
            Role,
            KycStatus,
            ProfileResponse,
            WalletResponse,
            TransactionRecord,
            TxKind,
            TxStatus,
            KycDocument,
            DocumentType,
            ReviewStatus,
            Currency,
            Country,
            ExchangeRate,
            Reserve,
            ReserveTransaction,
            BasketComposition,
            AssetType,
            ReserveTxKind,
            ReserveTxStatus,
            RoleRecord,
            NewsArticle,
            NewsCategory,
            EconomicIndicator,
            IndicatorKind,
            FieldError,
            PageMeta,
            health::HealthResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            wallets::CreateWalletRequest,
            transactions::CreateTransactionRequest,
            transactions::UpdateTransactionRequest,
            kyc::SubmitKycRequest,
            kyc::RejectKycRequest,
            roles::CreateRoleRequest,
            roles::UpdateRoleRequest,
            roles::AddPermissionRequest,
            currencies::CreateCurrencyRequest,
            currencies::UpdateCurrencyRequest,
            countries::CreateCountryRequest,
            countries::UpdateCountryRequest,
            exchange_rates::UpsertRateRequest,
            exchange_rates::ConversionResponse,
            reserves::CreateReserveRequest,
            reserves::UpdateReserveRequest,
            reserves::CreateReserveTxRequest,
            reserves::UpdateReserveTxStatusRequest,
            reserves::CreateBasketRequest,
            reserves::ReserveOverview,
            reserves::ReserveTotal,
            news_categories::CreateNewsCategoryRequest,
            news_categories::UpdateNewsCategoryRequest,
            news::CreateNewsRequest,
            news::UpdateNewsRequest,
            economic_indicators::CreateIndicatorRequest,
            economic_indicators::UpdateIndicatorRequest,
            admin::PlatformStats,
            admin::UserActivity,
            admin::SuspendResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Session tokens"),
        (name = "Users", description = "User management"),
        (name = "Wallets", description = "Custodial wallets"),
        (name = "Transactions", description = "Ledger transactions"),
        (name = "KYC", description = "Identity document review"),
        (name = "Roles", description = "Permission sets"),
        (name = "Currencies", description = "Currency reference data"),
        (name = "Countries", description = "Country reference data"),
        (name = "Exchange Rates", description = "Rates and conversion"),
        (name = "Reserves", description = "Reserve holdings and basket composition"),
        (name = "News", description = "Platform news and categories"),
        (name = "Economic Indicators", description = "Macro reference data"),
        (name = "Admin", description = "Platform administration")
    )
)]
struct ApiDoc;

/*!
# Car Inventory & Sales Dashboard

A car inventory service with a sales statistics dashboard, built in Rust.

## Overview

The application keeps a catalogue of cars, a history of individual sales and
per-user favorites in a small JSON file database, and serves them over a JSON
HTTP API. Its core is a pure aggregation pipeline that turns the raw sale
records into the three series the dashboard charts.

## Architecture

### Aggregation Pipeline
- **Continent Resolver** - Maps a country name to its continent, `"Other"` when unknown
- **Filter Stage** - Narrows the records by year, continent and make, each `"all"`-able
- **Sales Aggregator** - Builds the annual, per-country and per-model/release-year series

The pipeline is synchronous and side-effect free. A request works on a shared,
immutable snapshot of the sales loaded at startup.

### Service Layer
- **Dashboard** - Filter options and the current selection over a snapshot
- **Cars** - Validation, listing with pagination, CRUD
- **Sales** - Raw sale listing with exact and case-insensitive filters
- **Login / Favorites** - Argon2 password hashes, HTTP Basic auth, per-user favorites
- **Cache** - Time-to-live cache for car listings with an injectable clock

### Output
- CSV and XLSX export of each series
- PNG charts rendered with plotters

## Modules

- **continent**: Country to continent table
- **filter**: `Selector` and the filter stage
- **aggregator**: The three sales series
- **sale**: Sale records and series row types
- **dashboard**: Selection state and filter options
- **downloader**: Export functionality (CSV, XLSX)
- **graph**: Chart generation from a series
- **cars**, **sales**, **favorites**, **login**: Record stores
- **store**: JSON file database
- **cache**: TTL cache
- **config**: Environment configuration
- **generator**: Demo data
- **app**: Routing and middleware

## REST API Endpoints

- `POST /register`, `POST /login` - Account creation and credential check
- `/cars`, `/cars/{id}` - Inventory listing and CRUD
- `/sales` - Raw sales with `country`, `model`, `sale_year`, `release_year` filters
- `/favorites`, `/favorites/{id}` - The authenticated user's favorites
- `/api/sales/overview` - Dashboard series for `year`, `continent`, `make`, `top`
- `/api/sales/export/{chart}` - CSV or XLSX download of one series
- `/api/sales/chart/{chart}` - PNG rendering of one series
*/

pub mod aggregator;
pub mod cache;
pub mod cars;
pub mod config;
pub mod continent;
pub mod dashboard;
pub mod downloader;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod generator;
pub mod sale;
pub mod sales;
pub mod store;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;
#[cfg(feature = "web")]
pub mod login;

pub use aggregator::{Truncation, aggregate, aggregate_with};
pub use error::{Error, Result};
pub use filter::{Selector, apply_filters};
pub use sale::{AnnualTotal, CountryTotal, ModelYearRow, SaleRecord, SalesSeries};

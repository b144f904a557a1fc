use utoipa::OpenApi;

use crate::dto::{CatalogSummary, CorpusSummary, FacetParamsBody};
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "carfacets",
        description = "Faceted filter counts for car listings"
    ),
    paths(
        handlers::facets::get_facets,
        handlers::facets::post_facets,
        handlers::corpus::put_corpus,
        handlers::corpus::get_corpus,
        handlers::catalog::put_catalog,
        handlers::settings::get_settings,
        handlers::health::health,
    ),
    components(schemas(FacetParamsBody, CorpusSummary, CatalogSummary)),
    tags(
        (name = "facets", description = "Facet counts and range options"),
        (name = "corpus", description = "Corpus snapshot management"),
        (name = "catalog", description = "Display label catalog"),
        (name = "settings", description = "Facet configuration"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

use actix_cors::Cors;

pub fn cors_middleware() -> Cors {
    // map frontends run on arbitrary origins; everything here is read-only
    Cors::permissive().max_age(3600)
}

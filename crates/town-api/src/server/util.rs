fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS,PUT,PATCH,DELETE"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-max-age"),
        HeaderValue::from_static("3600"),
    );
}

fn default_checkpoint_dir() -> String {
    std::env::var("TOWN_CHECKPOINT_DIR")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CHECKPOINT_DIR.to_string())
}

/// Validate an events page request. Returns the clamped (offset, limit).
fn paginate(
    total: usize,
    offset: Option<usize>,
    limit: Option<usize>,
) -> Result<(usize, usize), HttpApiError> {
    let offset = offset.unwrap_or(0);
    if offset > total {
        return Err(HttpApiError::invalid_query(
            "offset is out of bounds",
            Some(format!("offset={offset} total={total}")),
        ));
    }
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    Ok((offset, limit))
}

/// Action ids are derived from the audit position so they stay unique within
/// a sim's lifetime.
fn next_action_id(engine: &EngineApi) -> String {
    format!(
        "act_{:06}_{:03}",
        engine.status().current_tick,
        engine.action_audit().len()
    )
}

use super::ApiError;

pub const MIN_REVIEW_TEXT_LEN: usize = 10;

pub fn validate_rating(rating: i32) -> Result<i32, ApiError> {
    if !(1..=10).contains(&rating) {
        return Err(ApiError::validation(format!(
            "Invalid rating: {rating}. Rating must be between 1 and 10"
        )));
    }
    Ok(rating)
}

pub fn validate_review_text(text: &str) -> Result<&str, ApiError> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_REVIEW_TEXT_LEN {
        return Err(ApiError::validation(format!(
            "Review text must be at least {MIN_REVIEW_TEXT_LEN} characters"
        )));
    }
    Ok(trimmed)
}

pub fn validate_movie_ref<'a>(movie_id: &'a str, movie_title: &str) -> Result<&'a str, ApiError> {
    if movie_id.trim().is_empty() {
        return Err(ApiError::validation("Movie id is required"));
    }
    if movie_title.trim().is_empty() {
        return Err(ApiError::validation("Movie title is required"));
    }
    Ok(movie_id)
}

pub fn validate_sub_score(name: &str, score: i32) -> Result<i32, ApiError> {
    if !(1..=10).contains(&score) {
        return Err(ApiError::validation(format!(
            "Invalid {name} score: {score}. Scores must be between 1 and 10"
        )));
    }
    Ok(score)
}

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if trimmed.chars().count() > 30 {
        return Err(ApiError::validation(
            "Username must be 30 characters or less",
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::validation(
            "Username can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }
    Ok(password)
}

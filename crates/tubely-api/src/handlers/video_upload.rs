use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{
    discard_stored, load_owned_video, parse_video_id, spool_video_field, VIDEO_CONTENT_TYPE,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tubely_core::VideoResponse;
use tubely_storage::keys::{random_token, video_key};

const VIDEO_FIELD: &str = "video";

/// Upload the video file for an existing video record.
///
/// The file is rewritten for fast-start playback, classified by aspect
/// ratio and stored under `{orientation}/{random}.mp4`.
#[tracing::instrument(skip(state, auth, multipart), fields(user_id = %auth.user_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let mut video = load_owned_video(state.videos.as_ref(), video_id, auth.user_id).await?;

    let start = Instant::now();
    let upload =
        spool_video_field(multipart, VIDEO_FIELD, state.config.max_video_size_bytes()).await?;
    let upload_size = upload.size;

    // Kills any running media tool if the client goes away mid-request.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let processed = state.pipeline.process(upload.path(), &cancel).await?;
    upload.close();

    let storage_key = video_key(processed.orientation.as_str(), &random_token(), "mp4");
    let stored = state
        .storage
        .upload_file(&storage_key, &processed.path, VIDEO_CONTENT_TYPE)
        .await;

    let orientation = processed.orientation;
    if let Err(e) = processed.remove().await {
        tracing::warn!(error = %e, "Failed to remove processed video");
    }
    let video_url = stored?;

    video.video_url = Some(video_url);
    let video = match state.videos.update_video(&video).await {
        Ok(video) => video,
        Err(e) => {
            discard_stored(state.storage.as_ref(), &storage_key).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        video_id = %video.id,
        orientation = %orientation,
        storage_key = %storage_key,
        size_bytes = upload_size,
        duration_ms = start.elapsed().as_millis(),
        "Video uploaded"
    );

    Ok((StatusCode::OK, Json(VideoResponse::from(video))))
}

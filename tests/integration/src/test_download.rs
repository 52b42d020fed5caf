//! Downloading result files of finished jobs over real HTTP.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hunyuan_client::{
        ClientError, Downloader, JobHandle, JobKind, JobPoller, PollOutcome, PollPolicy,
        QueryResponse, TokioDelay,
    };
    use serde_json::json;

    use crate::{FakeApi, JOB_ID, Reply, zip_archive};

    fn downloader() -> Downloader {
        Downloader::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_should_download_and_extract_finished_job() {
        let api = FakeApi::start([]).await.unwrap();
        let archive = zip_archive(&[
            ("model.obj", b"v 0 0 0\n".as_slice()),
            ("material.mtl", b"newmtl m\n".as_slice()),
        ])
        .unwrap();
        let model_url = api.serve_file("/files/job-123/model.zip", archive);
        let preview_url = api.serve_file("/files/job-123/preview.png", b"png".as_slice());

        api.push_reply(Reply::Json(json!({
            "Status": "DONE",
            "ResultFile3Ds": [{"Type": "OBJ", "Url": model_url, "PreviewImageUrl": preview_url}],
            "RequestId": "req-q"
        })));

        let client = api.client().unwrap();
        let handle = JobHandle::new(JOB_ID, JobKind::Professional);
        let outcome = JobPoller::new(
            PollPolicy::for_kind(JobKind::Professional).with_interval(Duration::ZERO),
            TokioDelay,
        )
        .poll(&client, &handle)
        .await
        .unwrap();
        let response = match outcome {
            PollOutcome::Terminal { response, .. } => response,
            other => panic!("expected Terminal, got {other:?}"),
        };

        let base = tempfile::tempdir().unwrap();
        let downloaded = downloader()
            .download_results(&handle, &response, base.path())
            .await
            .unwrap();

        let dir = &downloaded.output_dir;
        assert!(dir.starts_with(base.path()));
        assert!(
            dir.file_name()
                .unwrap()
                .to_string_lossy()
                .ends_with("_job-123_download")
        );
        assert_eq!(
            downloaded.files,
            [
                dir.join("job-123_obj.zip"),
                dir.join("job-123_obj_preview.png"),
                dir.join("model.obj"),
                dir.join("material.mtl"),
            ]
        );
        assert!(downloaded.failed.is_empty());
        assert_eq!(std::fs::read(dir.join("model.obj")).unwrap(), b"v 0 0 0\n");
        assert_eq!(std::fs::read(dir.join("job-123_obj_preview.png")).unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_should_record_missing_files_and_keep_going() {
        let api = FakeApi::start([]).await.unwrap();
        let glb_url = api.serve_file("/files/job-123/model.glb", b"glTF".as_slice());
        let missing_url = api.url("/files/job-123/gone.png");

        let response: QueryResponse = serde_json::from_value(json!({
            "Status": "success",
            "ResultFile3Ds": [{"Type": "GLB", "Url": glb_url, "PreviewImageUrl": &missing_url}]
        }))
        .unwrap();

        let base = tempfile::tempdir().unwrap();
        let downloaded = downloader()
            .download_results(
                &JobHandle::new(JOB_ID, JobKind::Rapid),
                &response,
                base.path(),
            )
            .await
            .unwrap();

        assert_eq!(
            downloaded.files,
            [downloaded.output_dir.join("job-123_glb.glb")]
        );
        assert_eq!(downloaded.failed, [missing_url]);
    }

    #[tokio::test]
    async fn test_should_surface_http_status_of_failed_file_download() {
        let api = FakeApi::start([]).await.unwrap();
        let base = tempfile::tempdir().unwrap();

        let err = downloader()
            .download_file(&api.url("/files/none.obj"), base.path(), "none.obj")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::HttpStatus { status: 404, .. }));
        assert!(!base.path().join("none.obj").exists());
    }
}

use ais_consumer::{
    MergePolicy, ThresholdClassifier, overlay::MarkerClass, settings::Settings,
};
use ais_core::{BacklogEntry, Classification, ConnectionStatus, Coordinates, VesselId};
use serde_json::json;

use crate::helper::{test, test_with_settings};

#[tokio::test]
async fn test_status_is_open_once_stream_starts() {
    test(|mut helper| async move {
        let snapshot = helper
            .wait_for(|s| s.status == ConnectionStatus::Open)
            .await;
        assert!(snapshot.vessels.is_empty());
        assert!(snapshot.backlog.is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_banner_is_only_added_to_backlog() {
    test(|mut helper| async move {
        helper
            .ais_source
            .send_frame("Connected to AIS stream!")
            .await
            .unwrap();

        let snapshot = helper.wait_for(|s| !s.backlog.is_empty()).await;
        assert!(snapshot.vessels.is_empty());
        assert_eq!(
            snapshot.backlog,
            vec![BacklogEntry::Text("Connected to AIS stream!".into())]
        );
    })
    .await;
}

#[tokio::test]
async fn test_vessel_is_moved_by_second_report() {
    test(|mut helper| async move {
        helper
            .ais_source
            .send_json(&json!({ "MMSI": "366123456", "Latitude": 29.5, "Longitude": -94.8 }))
            .await
            .unwrap();
        helper.wait_for_vessels(1).await;

        helper
            .ais_source
            .send_json(&json!({ "MMSI": "366123456", "Latitude": 29.6, "Longitude": -94.9 }))
            .await
            .unwrap();

        let snapshot = helper
            .wait_for(|s| {
                s.vessels
                    .first()
                    .is_some_and(|v| v.position == Coordinates::new(29.6, -94.9))
            })
            .await;
        assert_eq!(snapshot.vessels.len(), 1);
        assert_eq!(snapshot.vessels[0].id.as_str(), "366123456");
    })
    .await;
}

#[tokio::test]
async fn test_malformed_frames_do_not_stop_the_session() {
    test(|mut helper| async move {
        for frame in ["{\"MMSI\": ", "null", "[1, 2]", "{\"Latitude\": 29.5}"] {
            helper.ais_source.send_frame(frame).await.unwrap();
        }
        helper
            .ais_source
            .send_json(&json!({ "mmsi": 257000001, "LAT": 63.4, "LON": 10.4 }))
            .await
            .unwrap();

        let snapshot = helper.wait_for_vessels(1).await;
        assert_eq!(snapshot.status, ConnectionStatus::Open);
        assert_eq!(snapshot.vessels[0].id.as_str(), "257000001");
        assert_eq!(snapshot.backlog.len(), 5);
    })
    .await;
}

#[tokio::test]
async fn test_closed_stream_is_reported_and_state_kept() {
    test(|mut helper| async move {
        helper
            .ais_source
            .send_json(&json!({ "MMSI": "1", "Latitude": 1.0, "Longitude": 1.0 }))
            .await
            .unwrap();
        helper.ais_source.close();

        let snapshot = helper
            .wait_for(|s| s.status == ConnectionStatus::Closed)
            .await;
        assert_eq!(snapshot.vessels.len(), 1);

        let reconciler = helper.session.join().await.unwrap();
        assert_eq!(reconciler.len(), 1);
        assert_eq!(reconciler.status(), ConnectionStatus::Closed);
    })
    .await;
}

#[tokio::test]
async fn test_shutdown_detaches_the_transport() {
    test(|mut helper| async move {
        helper
            .ais_source
            .send_json(&json!({ "MMSI": "1", "Latitude": 1.0, "Longitude": 1.0 }))
            .await
            .unwrap();
        helper.wait_for_vessels(1).await;

        let reconciler = helper.session.shutdown().await.unwrap();
        assert_eq!(reconciler.len(), 1);

        assert!(
            helper
                .ais_source
                .send_json(&json!({ "MMSI": "2", "Latitude": 2.0, "Longitude": 2.0 }))
                .await
                .is_err()
        );
    })
    .await;
}

#[tokio::test]
async fn test_latest_reported_policy_keeps_fresher_report() {
    let mut settings = Settings::test_default();
    settings.stream.merge_policy = MergePolicy::LatestReported;

    test_with_settings(settings, |mut helper| async move {
        helper
            .ais_source
            .send_json(&json!({
                "MMSI": "9", "Latitude": 10.0, "Longitude": 10.0,
                "BaseDateTime": "2019-05-10T10:05:00",
            }))
            .await
            .unwrap();
        helper
            .ais_source
            .send_json(&json!({
                "MMSI": "9", "Latitude": 11.0, "Longitude": 11.0,
                "BaseDateTime": "2019-05-10T10:00:00",
            }))
            .await
            .unwrap();

        let snapshot = helper.wait_for(|s| s.backlog.len() == 2).await;
        assert_eq!(snapshot.vessels[0].position, Coordinates::new(10.0, 10.0));
    })
    .await;
}

#[tokio::test]
async fn test_classifier_limits_drive_the_overlay() {
    let mut settings = Settings::test_default();
    settings.classifier = ThresholdClassifier {
        knots_limit: Some(70.0),
        ..Default::default()
    };

    test_with_settings(settings, |mut helper| async move {
        helper
            .ais_source
            .send_json(&json!({ "MMSI": "1", "Latitude": 1.0, "Longitude": 1.0, "SOG": 85.0 }))
            .await
            .unwrap();
        helper
            .ais_source
            .send_json(&json!({
                "MMSI": "2",
                "aggregated_data": { "LastLAT": 2.0, "LastLON": 2.0, "isAnomalous": 0 },
            }))
            .await
            .unwrap();

        let snapshot = helper.wait_for_vessels(2).await;
        let fast = VesselId::new("1").unwrap();
        assert_eq!(
            snapshot
                .vessels
                .iter()
                .find(|v| v.id == fast)
                .unwrap()
                .classification,
            Classification::Anomalous
        );

        let shown = snapshot.overlay(true);
        assert_eq!(shown[0].class, MarkerClass::Anomalous);
        assert_eq!(shown[0].popup.is_anomalous, "Yes");
        assert_eq!(shown[1].class, MarkerClass::Normal);

        let hidden = snapshot.overlay(false);
        assert!(hidden.iter().all(|e| e.class == MarkerClass::Normal));
    })
    .await;
}

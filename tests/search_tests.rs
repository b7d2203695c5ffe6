mod common;

use common::{ORIGIN, create_test_state, create_user, donation_at, pickup_time, post_donation};
use food_share::{
    models::{status::RequestStatus, user::Role},
    services::{
        error::ServiceError,
        geo::{GeoPoint, haversine_km},
        search_service::NearbyQuery,
    },
};

fn origin() -> GeoPoint {
    GeoPoint::new(ORIGIN.0, ORIGIN.1).unwrap()
}

#[tokio::test]
async fn test_finds_donation_at_origin() {
    let (_tmp, state) = create_test_state().await;
    let donor = create_user(&state, "donor", Role::Donor).await;
    let donation = post_donation(&state, donor.id, ORIGIN.0, ORIGIN.1).await;

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).radius_km(1.0))
        .await
        .expect("search failed");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].listing.donation.id, donation.id);
    assert_eq!(hits[0].listing.donor_name, "donor");
    assert!(hits[0].distance_km.abs() < 1e-9);

    // A zero radius still matches the exact coordinates.
    let exact = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).radius_km(0.0))
        .await
        .unwrap();
    assert_eq!(exact.len(), 1);
}

#[tokio::test]
async fn test_results_sorted_by_distance() {
    let (_tmp, state) = create_test_state().await;
    let donor = create_user(&state, "donor", Role::Donor).await;

    let far = post_donation(&state, donor.id, ORIGIN.0 + 0.05, ORIGIN.1).await;
    let near = post_donation(&state, donor.id, ORIGIN.0 + 0.01, ORIGIN.1).await;
    let mid = post_donation(&state, donor.id, ORIGIN.0, ORIGIN.1 + 0.03).await;
    // ~111 km north, outside the default radius.
    post_donation(&state, donor.id, ORIGIN.0 + 1.0, ORIGIN.1).await;

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()))
        .await
        .unwrap();

    let ids: Vec<_> = hits.iter().map(|h| h.listing.donation.id).collect();
    assert_eq!(ids, vec![near.id, mid.id, far.id]);
    assert!(hits.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    assert!(hits.iter().all(|h| h.distance_km <= 10.0));
}

#[tokio::test]
async fn test_equal_distance_ties_break_by_id() {
    let (_tmp, state) = create_test_state().await;
    let donor = create_user(&state, "donor", Role::Donor).await;

    let a = post_donation(&state, donor.id, ORIGIN.0 + 0.02, ORIGIN.1).await;
    let b = post_donation(&state, donor.id, ORIGIN.0 + 0.02, ORIGIN.1).await;
    let c = post_donation(&state, donor.id, ORIGIN.0 + 0.02, ORIGIN.1).await;

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()))
        .await
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.listing.donation.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn test_radius_boundary_is_inclusive() {
    let (_tmp, state) = create_test_state().await;
    let donor = create_user(&state, "donor", Role::Donor).await;
    let donation = post_donation(&state, donor.id, ORIGIN.0 + 0.04, ORIGIN.1 + 0.03).await;

    let exact = haversine_km(
        origin(),
        GeoPoint::new(donation.latitude, donation.longitude).unwrap(),
    );

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).radius_km(exact))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].distance_km, exact);

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).radius_km(exact * 0.99))
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_only_available_donations_are_listed() {
    let (_tmp, state) = create_test_state().await;
    let donor = create_user(&state, "donor", Role::Donor).await;
    let receiver = create_user(&state, "receiver", Role::Receiver).await;

    let open = post_donation(&state, donor.id, ORIGIN.0, ORIGIN.1).await;
    let reserved = post_donation(&state, donor.id, ORIGIN.0, ORIGIN.1).await;
    let collected = post_donation(&state, donor.id, ORIGIN.0, ORIGIN.1).await;

    state
        .lifecycle
        .create_request(reserved.id, receiver.id, pickup_time())
        .await
        .unwrap();
    let done = state
        .lifecycle
        .create_request(collected.id, receiver.id, pickup_time())
        .await
        .unwrap();
    state
        .lifecycle
        .update_request_status(done.id, RequestStatus::Accepted)
        .await
        .unwrap();
    state
        .lifecycle
        .update_request_status(done.id, RequestStatus::Completed)
        .await
        .unwrap();

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).radius_km(1.0))
        .await
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.listing.donation.id).collect();
    assert_eq!(ids, vec![open.id]);
}

#[tokio::test]
async fn test_category_filters() {
    let (_tmp, state) = create_test_state().await;
    let donor = create_user(&state, "donor", Role::Donor).await;

    let cooked = post_donation(&state, donor.id, ORIGIN.0, ORIGIN.1).await;
    let mut bread = donation_at(ORIGIN.0, ORIGIN.1);
    bread.food_type = "Bakery".into();
    bread.freshness = "packaged".into();
    let bread = state.lifecycle.create_donation(donor.id, bread).await.unwrap();

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).food_type("BAKERY"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].listing.donation.id, bread.id);

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).freshness("fresh"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].listing.donation.id, cooked.id);

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).food_type("all").freshness(""))
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);

    let hits = state
        .search
        .find_nearby(
            &NearbyQuery::new(origin())
                .food_type("cooked")
                .freshness("packaged"),
        )
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_limit_truncates_nearest_first() {
    let (_tmp, state) = create_test_state().await;
    let donor = create_user(&state, "donor", Role::Donor).await;

    let mut posted = Vec::new();
    for step in 0..5 {
        let lat = ORIGIN.0 + 0.01 * step as f64;
        posted.push(post_donation(&state, donor.id, lat, ORIGIN.1).await);
    }

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).limit(2))
        .await
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.listing.donation.id).collect();
    assert_eq!(ids, vec![posted[0].id, posted[1].id]);

    // Zero is clamped up to a single result.
    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).limit(0))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_invalid_radius_is_rejected() {
    let (_tmp, state) = create_test_state().await;

    for radius in [-1.0, f64::NAN, f64::INFINITY] {
        let err = state
            .search
            .find_nearby(&NearbyQuery::new(origin()).radius_km(radius))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument { field: "radius_km", .. }));
    }
}

#[tokio::test]
async fn test_empty_database_returns_nothing() {
    let (_tmp, state) = create_test_state().await;
    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin()).radius_km(20_000.0))
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_tiny_radius_matches_full_scan() {
    let (_tmp, state) = create_test_state().await;
    let donor = create_user(&state, "donor", Role::Donor).await;
    let lng = -116.81252190611931;
    let donation = post_donation(&state, donor.id, 28.296022500810153, lng).await;

    // These points are ~0.12 m apart but the distance formula rounds to 0.
    let origin = GeoPoint::new(28.29602140770831, lng).unwrap();
    let radius = 1.0163e-5;
    let location = GeoPoint::new(donation.latitude, donation.longitude).unwrap();
    assert!(haversine_km(origin, location) <= radius);

    let hits = state
        .search
        .find_nearby(&NearbyQuery::new(origin).radius_km(radius))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].listing.donation.id, donation.id);
}

/// End-to-end tests for the ranking and pagination core.
///
/// These drive the same pure pipeline the HTTP handler uses (score, sort,
/// slice) over synthetic image sets, checking the client-observable
/// pagination contract.
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use gallery_service::models::{Image, ImageScores};
use gallery_service::services::gallery::{paginate, rank_images, sort_ranked, RankedImage};
use gallery_service::services::ranking;
use gallery_service::PAGE_SIZE;

fn image(views: i64, upvotes: i64, shares: i64, created_at: DateTime<Utc>) -> Image {
    Image {
        id: Uuid::new_v4(),
        prompt: format!("prompt {}", views),
        image_url: "https://cdn.example/test.png".into(),
        user_id: Uuid::new_v4(),
        request_id: Uuid::new_v4().to_string(),
        is_public: true,
        views,
        upvotes,
        shares,
        saves: 0,
        created_at,
        tags: vec![],
    }
}

fn synthetic_set(count: i64, now: DateTime<Utc>) -> Vec<Image> {
    (0..count)
        .map(|i| {
            image(
                (i * 37) % 500,
                (i * 11) % 60,
                (i * 7) % 25,
                now - Duration::hours((i * 5) % 200),
            )
        })
        .collect()
}

#[test]
fn full_page_walk_partitions_the_ranked_set() {
    let now = Utc::now();
    let ranked = rank_images(synthetic_set(100, now), now);

    let mut seen = std::collections::HashSet::new();
    let mut collected = Vec::new();
    let mut page = 1;

    loop {
        let (items, has_more) = paginate(&ranked, page, PAGE_SIZE);

        if has_more {
            // Every page before the last is exactly full
            assert_eq!(items.len(), PAGE_SIZE, "page {} not full", page);
        }
        for item in &items {
            // No duplicates across pages
            assert!(seen.insert(item.image.id), "duplicate {}", item.image.id);
        }
        collected.extend(items);

        if !has_more {
            break;
        }
        page += 1;
    }

    // No omissions, and concatenation preserves the ranked order
    assert_eq!(collected.len(), ranked.len());
    for (got, want) in collected.iter().zip(ranked.iter()) {
        assert_eq!(got.image.id, want.image.id);
    }

    // One page past the end is empty, not an error
    let (beyond, has_more) = paginate(&ranked, page + 1, PAGE_SIZE);
    assert!(beyond.is_empty());
    assert!(!has_more);
}

#[test]
fn large_filtered_sets_are_paged_without_omissions() {
    // A popular but old image must still surface somewhere in the walk,
    // no matter how many newer images exist above it
    let now = Utc::now();
    let mut images = synthetic_set(1500, now);
    let veteran = image(100_000, 9_000, 2_000, now - Duration::days(400));
    let veteran_id = veteran.id;
    images.push(veteran);

    let total = images.len();
    let ranked = rank_images(images, now);
    assert_eq!(ranked.len(), total);

    let mut seen = std::collections::HashSet::new();
    let mut page = 1;
    loop {
        let (items, has_more) = paginate(&ranked, page, PAGE_SIZE);
        for item in &items {
            seen.insert(item.image.id);
        }
        if !has_more {
            break;
        }
        page += 1;
    }

    assert_eq!(seen.len(), total);
    assert!(seen.contains(&veteran_id));
}

#[test]
fn repeated_requests_over_unchanged_data_are_identical() {
    let now = Utc::now();
    let images = synthetic_set(40, now);

    let first = rank_images(images.clone(), now);
    let second = rank_images(images, now);

    for page in 1..=4 {
        let (a, a_more) = paginate(&first, page, PAGE_SIZE);
        let (b, b_more) = paginate(&second, page, PAGE_SIZE);
        assert_eq!(a_more, b_more);
        let a_ids: Vec<Uuid> = a.iter().map(|r| r.image.id).collect();
        let b_ids: Vec<Uuid> = b.iter().map(|r| r.image.id).collect();
        assert_eq!(a_ids, b_ids);
    }
}

#[test]
fn ranking_order_is_monotone_in_final_score() {
    let now = Utc::now();
    let ranked = rank_images(synthetic_set(60, now), now);

    for pair in ranked.windows(2) {
        assert!(
            pair[0].scores.final_ranking_score >= pair[1].scores.final_ranking_score,
            "ranking not descending"
        );
        if (pair[0].scores.final_ranking_score - pair[1].scores.final_ranking_score).abs()
            < f64::EPSILON
        {
            // Deterministic tie-break: newest first
            assert!(pair[0].image.created_at >= pair[1].image.created_at);
        }
    }
}

#[test]
fn recency_breaks_ties_between_equal_signals() {
    let now = Utc::now();
    let week_old = image(200, 30, 10, now - Duration::days(7));
    let fresh = image(200, 30, 10, now - Duration::hours(1));
    let fresh_id = fresh.id;

    let ranked = rank_images(vec![week_old, fresh], now);
    assert_eq!(ranked[0].image.id, fresh_id);
}

#[test]
fn load_more_loop_terminates_on_short_page() {
    // Simulates the client contract: keep requesting page N+1 until a page
    // comes back shorter than PAGE_SIZE
    let now = Utc::now();
    let ranked = rank_images(synthetic_set((PAGE_SIZE as i64 * 2) + 3, now), now);

    let mut page = 1;
    let mut requests = 0;
    loop {
        requests += 1;
        assert!(requests <= 10, "client would paginate forever");
        let (items, _) = paginate(&ranked, page, PAGE_SIZE);
        if items.len() < PAGE_SIZE {
            break;
        }
        page += 1;
    }

    assert_eq!(page, 3);
}

#[test]
fn injected_scores_follow_documented_combination() {
    // Final score must be reproducible from the component scores alone
    let now = Utc::now();
    let img = image(120, 18, 6, now - Duration::hours(10));
    let scores = ranking::score_image(&img, now);

    let expected = scores.engagement_score.ln_1p() * ranking::ENGAGEMENT_WEIGHT
        + scores.quality_score * ranking::QUALITY_WEIGHT
        + scores.trending_score.ln_1p() * ranking::TRENDING_WEIGHT;
    assert!((scores.final_ranking_score - expected).abs() < 1e-12);
}

#[test]
fn pre_scored_fixture_keeps_documented_order() {
    // page_size 3 over A(9.1, Jan 5), B(9.1, Jan 1), C(8.0, Jan 9),
    // D(7.5, Jan 1): page 1 is [A, B, C], page 2 is [D]
    fn fixture(score: f64, day: u32) -> RankedImage {
        use chrono::TimeZone;
        RankedImage {
            image: image(0, 0, 0, Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            scores: ImageScores {
                engagement_score: 0.0,
                quality_score: 0.0,
                trending_score: 0.0,
                final_ranking_score: score,
            },
        }
    }

    let a = fixture(9.1, 5);
    let b = fixture(9.1, 1);
    let c = fixture(8.0, 9);
    let d = fixture(7.5, 1);
    let expect_p1 = [a.image.id, b.image.id, c.image.id];
    let expect_p2 = [d.image.id];

    let mut ranked = vec![c, d, a, b];
    sort_ranked(&mut ranked);

    let (p1, more) = paginate(&ranked, 1, 3);
    assert_eq!(
        p1.iter().map(|r| r.image.id).collect::<Vec<_>>(),
        expect_p1
    );
    assert!(more);

    let (p2, more) = paginate(&ranked, 2, 3);
    assert_eq!(
        p2.iter().map(|r| r.image.id).collect::<Vec<_>>(),
        expect_p2
    );
    assert!(!more);
}

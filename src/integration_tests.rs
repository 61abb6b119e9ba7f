#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::commands::analytics::{
        get_property_analytics_internal, get_renovation_analytics_internal,
        get_sale_analytics_internal,
    };
    use crate::commands::property::{
        create_property_internal, delete_property_internal, get_property_internal,
        list_properties_internal, update_property_internal, PropertyFilter, PropertyInput,
        PropertyUpdate,
    };
    use crate::commands::renovation::{
        create_renovation_internal, update_renovation_internal, RenovationInput, RenovationUpdate,
    };
    use crate::commands::sale::{create_sale_internal, delete_sale_internal, SaleInput};
    use crate::db::{self, DbPool};
    use crate::error::PortfolioError;

    async fn setup_test_db() -> DbPool {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = db::init_pool(&database_url)
            .await
            .expect("Failed to create pool");
        db::init_database(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    fn property_input(marker: &str) -> PropertyInput {
        PropertyInput {
            address: format!("100 Test St ({})", marker),
            city: format!("Testville ({})", marker),
            state: "WA".to_string(),
            zip_code: "98101".to_string(),
            property_type: "Condo".to_string(),
            bedrooms: 2.0,
            bathrooms: 1.5,
            square_feet: 900,
            lot_size: Some(0.05),
            year_built: Some(1999),
            current_value: Some(550_000.0),
            purchase_price: Some(500_000.0),
        }
    }

    fn sale_input(property_id: i32, marker: &str) -> SaleInput {
        SaleInput {
            property_id,
            sale_price: 600_000.0,
            sale_date: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            days_on_market: 45,
            buyer_name: "Test Buyer".to_string(),
            buyer_email: format!("buyer+{}@example.com", marker),
            buyer_phone: "206-555-0100".to_string(),
            agent_name: "Test Agent".to_string(),
            agent_email: format!("agent+{}@example.com", marker),
            agent_phone: "206-555-0200".to_string(),
        }
    }

    async fn remove_property(pool: &DbPool, id: i32) {
        let _ = sqlx::query("DELETE FROM sales WHERE property_id = $1")
            .bind(id)
            .execute(pool)
            .await;
        let _ = sqlx::query("DELETE FROM renovations WHERE property_id = $1")
            .bind(id)
            .execute(pool)
            .await;
        let _ = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await;
    }

    #[tokio::test]
    async fn test_property_create_get_roundtrip() {
        let pool = setup_test_db().await;

        let input = property_input("crud-roundtrip");
        let created = create_property_internal(&pool, input.clone())
            .await
            .expect("create_property_internal failed");

        let fetched = get_property_internal(&pool, created.id)
            .await
            .expect("get_property_internal failed");

        assert_eq!(fetched.address, input.address);
        assert_eq!(fetched.city, input.city);
        assert_eq!(fetched.property_type, input.property_type);
        assert_eq!(fetched.bedrooms, input.bedrooms);
        assert_eq!(fetched.square_feet, input.square_feet);
        assert_eq!(fetched.current_value, input.current_value);
        assert_eq!(fetched.created_at, created.created_at);

        remove_property(&pool, created.id).await;
    }

    #[tokio::test]
    async fn test_partial_update_retains_unset_fields() {
        let pool = setup_test_db().await;

        let created = create_property_internal(&pool, property_input("partial-update"))
            .await
            .expect("create failed");

        let updated = update_property_internal(
            &pool,
            created.id,
            PropertyUpdate {
                current_value: Some(700_000.0),
                ..Default::default()
            },
        )
        .await
        .expect("update failed");

        assert_eq!(updated.current_value, Some(700_000.0));
        // Everything not supplied keeps its stored value
        assert_eq!(updated.address, created.address);
        assert_eq!(updated.city, created.city);
        assert_eq!(updated.bedrooms, created.bedrooms);
        assert_eq!(updated.purchase_price, created.purchase_price);
        assert_eq!(updated.created_at, created.created_at);

        remove_property(&pool, created.id).await;
    }

    #[tokio::test]
    async fn test_delete_then_get_returns_not_found() {
        let pool = setup_test_db().await;

        let created = create_property_internal(&pool, property_input("delete-get"))
            .await
            .expect("create failed");

        delete_property_internal(&pool, created.id)
            .await
            .expect("delete failed");

        let err = get_property_internal(&pool, created.id).await.unwrap_err();
        assert!(matches!(err, PortfolioError::NotFound(_)));

        let err = delete_property_internal(&pool, created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sale_requires_existing_property() {
        let pool = setup_test_db().await;

        let result = create_sale_internal(&pool, sale_input(-1, "dangling-fk")).await;
        let err = result.unwrap_err();
        assert!(matches!(err, PortfolioError::Validation(_)));

        // Nothing was persisted
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales WHERE buyer_email = $1")
            .bind("buyer+dangling-fk@example.com")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_list_pagination_window() {
        let pool = setup_test_db().await;

        let mut ids = Vec::new();
        for i in 0..5 {
            let mut input = property_input("pagination");
            input.address = format!("{} Page Ave (pagination)", 100 + i);
            let created = create_property_internal(&pool, input).await.unwrap();
            ids.push(created.id);
        }

        let page = list_properties_internal(
            &pool,
            PropertyFilter {
                city: Some("Testville (pagination)".to_string()),
                skip: Some(1),
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .expect("list failed");

        let page_ids: Vec<i32> = page.iter().map(|p| p.id).collect();
        assert_eq!(page_ids, vec![ids[1], ids[2]]);

        for id in ids {
            remove_property(&pool, id).await;
        }
    }

    #[tokio::test]
    async fn test_sale_roi_by_property_type() {
        let pool = setup_test_db().await;

        // Distinct type string so rows from other runs cannot join the group
        let marker_type = "Condo (roi-scenario)";
        let mut input = property_input("roi-scenario");
        input.property_type = marker_type.to_string();
        let property = create_property_internal(&pool, input).await.unwrap();

        let sale = create_sale_internal(&pool, sale_input(property.id, "roi-scenario"))
            .await
            .unwrap();

        let report = get_sale_analytics_internal(&pool).await.unwrap();
        let roi = report
            .roi_by_property_type
            .iter()
            .find(|r| r.property_type == marker_type)
            .expect("ROI group missing");

        // (600000 - 500000) / 500000 * 100 = 20.0
        assert!((roi.avg_roi - 20.0).abs() < 1e-9);

        delete_sale_internal(&pool, sale.id).await.unwrap();
        remove_property(&pool, property.id).await;
    }

    #[tokio::test]
    async fn test_property_type_grouping() {
        let pool = setup_test_db().await;

        let marker_type = "Single Family (grouping-scenario)";
        let mut ids = Vec::new();
        for value in [800_000.0, 1_000_000.0] {
            let mut input = property_input("grouping-scenario");
            input.property_type = marker_type.to_string();
            input.current_value = Some(value);
            ids.push(create_property_internal(&pool, input).await.unwrap().id);
        }

        let report = get_property_analytics_internal(&pool).await.unwrap();
        let group = report
            .property_type_distribution
            .iter()
            .find(|g| g.property_type == marker_type)
            .expect("type group missing");

        assert_eq!(group.count, 2);
        assert!((group.total_value - 1_800_000.0).abs() < 1e-6);
        assert!((group.avg_value - 900_000.0).abs() < 1e-6);

        for id in ids {
            remove_property(&pool, id).await;
        }
    }

    #[tokio::test]
    async fn test_roi_excludes_non_positive_purchase_price() {
        let pool = setup_test_db().await;

        let marker_type = "Condo (zero-basis)";
        let mut input = property_input("zero-basis");
        input.property_type = marker_type.to_string();
        input.purchase_price = Some(0.0);
        let property = create_property_internal(&pool, input).await.unwrap();

        let sale = create_sale_internal(&pool, sale_input(property.id, "zero-basis"))
            .await
            .unwrap();

        let report = get_sale_analytics_internal(&pool).await.unwrap();
        assert!(
            !report
                .roi_by_property_type
                .iter()
                .any(|r| r.property_type == marker_type),
            "zero purchase price must not produce an ROI group"
        );

        delete_sale_internal(&pool, sale.id).await.unwrap();
        remove_property(&pool, property.id).await;
    }

    #[tokio::test]
    async fn test_renovation_duration_always_derived() {
        let pool = setup_test_db().await;

        let property = create_property_internal(&pool, property_input("duration"))
            .await
            .unwrap();

        let renovation = create_renovation_internal(
            &pool,
            RenovationInput {
                property_id: property.id,
                renovation_type: "Kitchen Remodel".to_string(),
                description: "Full gut remodel".to_string(),
                cost: 45_000.0,
                start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                status: None,
            },
        )
        .await
        .expect("create renovation failed");

        assert_eq!(renovation.duration, 14);
        assert_eq!(renovation.status, "Planned");

        // Moving the end date recomputes the stored duration
        let updated = update_renovation_internal(
            &pool,
            renovation.id,
            RenovationUpdate {
                end_date: Some(NaiveDate::from_ymd_opt(2024, 3, 21).unwrap()),
                ..Default::default()
            },
        )
        .await
        .expect("update renovation failed");
        assert_eq!(updated.duration, 20);

        let err = update_renovation_internal(
            &pool,
            renovation.id,
            RenovationUpdate {
                end_date: Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PortfolioError::Validation(_)));

        remove_property(&pool, property.id).await;
    }

    #[tokio::test]
    async fn test_delete_property_with_dependents_rejected() {
        let pool = setup_test_db().await;

        let property = create_property_internal(&pool, property_input("restrict"))
            .await
            .unwrap();
        let sale = create_sale_internal(&pool, sale_input(property.id, "restrict"))
            .await
            .unwrap();

        let err = delete_property_internal(&pool, property.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::Validation(_)));

        // Once the history is gone the property can be removed
        delete_sale_internal(&pool, sale.id).await.unwrap();
        delete_property_internal(&pool, property.id)
            .await
            .expect("delete after removing dependents failed");
    }

    #[tokio::test]
    async fn test_analytics_reports_never_fail() {
        let pool = setup_test_db().await;

        // Whatever the current dataset, every report computes and every
        // aggregate is a finite number (empty groups report zero).
        let properties = get_property_analytics_internal(&pool).await.unwrap();
        assert!(properties.avg_bedrooms.is_finite());
        assert!(properties.total_value.is_finite());

        let sales = get_sale_analytics_internal(&pool).await.unwrap();
        assert!(sales.avg_sale_price.is_finite());
        for roi in &sales.roi_by_property_type {
            assert!(roi.avg_roi.is_finite());
        }
        for trend in &sales.monthly_trends {
            assert_eq!(trend.month.len(), 7, "month label must be YYYY-MM");
        }

        let renovations = get_renovation_analytics_internal(&pool).await.unwrap();
        assert!(renovations.avg_cost.is_finite());
        assert!(renovations.avg_duration.is_finite());
    }
}

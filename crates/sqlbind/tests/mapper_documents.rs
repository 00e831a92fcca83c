// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Mapper document feature tests: result maps, discriminators, sql
//! fragments, includes, and database-id filtering.


use sqlbind::builder::XmlMapperBuilder;
use sqlbind::config::Configuration;
use sqlbind::error::BuilderError;
use sqlbind::mapping::SqlCommandType;
use sqlbind::schema::{MethodDef, TypeDef, TypeSchema};
use sqlbind::{TypeRef, Value};
use std::sync::Arc;

fn config() -> Configuration {
    Configuration::new(Arc::new(TypeSchema::new()))
}

fn parse(config: &Configuration, resource: &str, xml: &str) {
    XmlMapperBuilder::new(config, resource).parse(xml).unwrap();
}

#[test]
fn test_extends_merge_drops_parent_constructors() {
    let config = config();
    parse(
        &config,
        "maps.xml",
        r#"<mapper namespace="app.Maps">
             <resultMap id="parent" type="map">
               <constructor><arg name="x" column="x"/></constructor>
               <id property="id" column="pk"/>
               <result property="name" column="name"/>
             </resultMap>
             <resultMap id="child" type="map" extends="parent">
               <constructor><arg name="y" column="y"/></constructor>
               <result property="email" column="email"/>
             </resultMap>
           </mapper>"#,
    );
    let child = config.result_map("app.Maps.child").unwrap();
    let properties: Vec<&str> = child
        .mappings()
        .iter()
        .map(|m| m.property.as_deref().unwrap())
        .collect();
    assert_eq!(properties, vec!["y", "email", "id", "name"]);
    assert_eq!(child.constructor_mappings().len(), 1);
    assert_eq!(child.constructor_mappings()[0].property.as_deref(), Some("y"));
}

#[test]
fn test_nested_result_maps_get_generated_ids() {
    let config = config();
    parse(
        &config,
        "blog.xml",
        r#"<mapper namespace="app.Blog">
             <resultMap id="blogMap" type="map">
               <id property="id" column="id"/>
               <collection property="posts" ofType="map">
                 <id property="postId" column="post_id"/>
               </collection>
               <association property="author" javaType="map">
                 <result property="name" column="author_name"/>
               </association>
             </resultMap>
           </mapper>"#,
    );
    let blog = config.result_map("app.Blog.blogMap").unwrap();
    assert!(blog.has_nested_result_maps());
    let nested: Vec<String> = blog
        .mappings()
        .iter()
        .filter_map(|m| m.nested_result_map_id.clone())
        .collect();
    assert_eq!(nested.len(), 2);
    for id in &nested {
        assert!(config.result_map(id).is_some(), "missing nested map {}", id);
    }
    assert!(nested.iter().any(|id| id.contains("collection[posts]")));
}

#[test]
fn test_discriminator_cases() {
    let config = config();
    parse(
        &config,
        "vehicle.xml",
        r#"<mapper namespace="app.Vehicle">
             <resultMap id="carMap" type="map">
               <result property="doors" column="doors"/>
             </resultMap>
             <resultMap id="vehicleMap" type="map">
               <id property="id" column="id"/>
               <discriminator column="vehicle_type" javaType="int">
                 <case value="1" resultMap="carMap"/>
                 <case value="2">
                   <result property="wheels" column="wheels"/>
                 </case>
               </discriminator>
             </resultMap>
           </mapper>"#,
    );
    let map = config.result_map("app.Vehicle.vehicleMap").unwrap();
    let discriminator = map.discriminator().unwrap();
    assert_eq!(discriminator.column.as_deref(), Some("vehicle_type"));
    assert_eq!(
        discriminator.cases.get("1").map(String::as_str),
        Some("app.Vehicle.carMap")
    );
    let inline = discriminator.cases.get("2").unwrap();
    assert!(config.result_map(inline).is_some());
}

#[test]
fn test_nested_select_and_composite_columns() {
    let config = config();
    parse(
        &config,
        "orders.xml",
        r#"<mapper namespace="app.Orders">
             <resultMap id="orderMap" type="map">
               <association property="customer" column="{cid=customer_id,region=region_id}"
                            select="app.Customers.selectById" javaType="map"/>
             </resultMap>
           </mapper>"#,
    );
    let map = config.result_map("app.Orders.orderMap").unwrap();
    let mapping = &map.mappings()[0];
    assert_eq!(
        mapping.nested_select_id.as_deref(),
        Some("app.Customers.selectById")
    );
    assert_eq!(mapping.composites.len(), 2);
    assert_eq!(mapping.composites[0].property, "cid");
    assert_eq!(mapping.composites[1].column, "region_id");
    assert!(map.has_nested_queries());
}

#[test]
fn test_composite_with_odd_tokens_rejected() {
    let config = config();
    let err = XmlMapperBuilder::new(&config, "bad.xml")
        .parse(
            r#"<mapper namespace="app.Bad">
                 <resultMap id="m" type="map">
                   <association property="c" column="{cid=customer_id,region}"
                                select="app.X.y" javaType="map"/>
                 </resultMap>
               </mapper>"#,
        )
        .unwrap_err();
    assert!(matches!(err, BuilderError::Malformed { .. }));
}

#[test]
fn test_sql_fragment_include() {
    let config = config();
    parse(
        &config,
        "frag.xml",
        r#"<mapper namespace="app.Frag">
             <sql id="columns">id, name, email</sql>
             <select id="selectAll" resultType="map">
               select <include refid="columns"/> from users
             </select>
           </mapper>"#,
    );
    let statement = config.mapped_statement("app.Frag.selectAll").unwrap();
    let sql = statement.bound_sql(&Value::Null).sql;
    assert!(sql.contains("id, name, email"));
    assert!(sql.contains("from users"));
}

#[test]
fn test_include_from_unparsed_namespace_defers_statement() {
    let config = config();
    parse(
        &config,
        "a.xml",
        r#"<mapper namespace="app.A">
             <select id="selectAll" resultType="map">
               select <include refid="app.Shared.columns"/> from users
             </select>
           </mapper>"#,
    );
    assert!(config.mapped_statement("app.A.selectAll").is_none());

    parse(
        &config,
        "shared.xml",
        r#"<mapper namespace="app.Shared">
             <sql id="columns">id, name</sql>
           </mapper>"#,
    );
    let statement = config.mapped_statement("app.A.selectAll").unwrap();
    assert!(statement.bound_sql(&Value::Null).sql.contains("id, name"));
}

#[test]
fn test_database_id_filters_statements_and_fragments() {
    let schema = Arc::new(TypeSchema::new());
    let mut config = Configuration::new(schema);
    config.set_database_id(Some("testdb".to_string()));

    parse(
        &config,
        "db.xml",
        r#"<mapper namespace="app.Db">
             <sql id="cols">generic_cols</sql>
             <sql id="cols" databaseId="testdb">testdb_cols</sql>
             <select id="pick" resultType="map">select <include refid="cols"/> from t</select>
             <select id="pick" databaseId="testdb" resultType="map">
               select testdb_pick from t
             </select>
             <select id="other" databaseId="unrelated" resultType="map">select 1</select>
           </mapper>"#,
    );
    // the database-specific variants win
    let pick = config.mapped_statement("app.Db.pick").unwrap();
    assert_eq!(pick.database_id(), Some("testdb"));
    assert!(pick.bound_sql(&Value::Null).sql.contains("testdb_pick"));
    // a statement for an unrelated database id is dropped entirely
    assert!(config.mapped_statement("app.Db.other").is_none());
    assert!(config.validate_pending().is_ok());
}

#[test]
fn test_statement_attributes() {
    let config = config();
    parse(
        &config,
        "attrs.xml",
        r#"<mapper namespace="app.Attrs">
             <insert id="create" useGeneratedKeys="true" keyProperty="id" keyColumn="user_id"
                     statementType="STATEMENT" timeout="7" flushCache="false">
               insert into users (name) values (#{name})
             </insert>
             <select id="page" resultType="map" fetchSize="100"
                     resultSetType="SCROLL_INSENSITIVE" resultOrdered="true" useCache="false">
               select * from users
             </select>
           </mapper>"#,
    );
    let create = config.mapped_statement("app.Attrs.create").unwrap();
    assert_eq!(create.sql_command_type(), SqlCommandType::Insert);
    assert_eq!(create.key_properties(), ["id"]);
    assert_eq!(create.key_columns(), ["user_id"]);
    assert_eq!(create.timeout(), Some(7));
    assert!(!create.is_flush_cache_required());
    assert!(matches!(
        create.key_generator(),
        sqlbind::mapping::KeyGeneratorKind::Jdbc3
    ));

    let page = config.mapped_statement("app.Attrs.page").unwrap();
    assert_eq!(page.fetch_size(), Some(100));
    assert!(page.is_result_ordered());
    assert!(!page.is_use_cache());
}

#[test]
fn test_mapper_binding_to_schema_type() {
    let schema = Arc::new(TypeSchema::new());
    schema.register(
        TypeDef::interface("app.UserMapper").method(MethodDef::new(
            "selectUser",
            vec![TypeRef::concrete("long")],
            TypeRef::concrete("map"),
        )),
    );
    let config = Configuration::new(schema);
    parse(
        &config,
        "users.xml",
        r#"<mapper namespace="app.UserMapper">
             <select id="selectUser" resultType="map">select 1</select>
           </mapper>"#,
    );
    assert!(config.has_mapper("app.UserMapper"));

    // a namespace with no matching schema type is silently skipped
    parse(
        &config,
        "ghost.xml",
        r#"<mapper namespace="app.GhostMapper">
             <select id="x" resultType="map">select 1</select>
           </mapper>"#,
    );
    assert!(!config.has_mapper("app.GhostMapper"));
}

#[test]
fn test_duplicate_statement_id_rejected() {
    let config = config();
    let err = XmlMapperBuilder::new(&config, "dup.xml")
        .parse(
            r#"<mapper namespace="app.Dup">
                 <select id="same" resultType="map">select 1</select>
                 <select id="same" resultType="map">select 2</select>
               </mapper>"#,
        )
        .unwrap_err();
    assert!(matches!(err, BuilderError::DuplicateId { .. }));
}

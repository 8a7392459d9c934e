use crate::graph::{
    vocab, Constraint, FeatureState, Identity, LiteralValue, NamedRef, NodeId, NodePool, Payload,
    SupertypeConstraint, Term,
};
use crate::table::{CellId, TableTree};

/// Template-vector slots: a central-tendency/population slot and a
/// dispersion/percentage slot.
const SLOTS: usize = 2;

const DEFAULT_MARKER: &str = "_default";

/// Interpret one table column: build the study-arm individual anchoring the
/// column, recursively assemble a characteristic per row from the row
/// header's tokens and the data cell's features, and return the arm node
/// followed by any top-level features that nothing subsumed.
pub fn interpret_column(tree: &mut TableTree, pool: &mut NodePool, header: CellId) -> Vec<NodeId> {
    ColumnAssembler::new(tree, pool, header).run(header)
}

struct ColumnAssembler<'a> {
    tree: &'a mut TableTree,
    pool: &'a mut NodePool,
    base: NodeId,
    arm_name: String,
    age_found: bool,
    use_open_paren: bool,
    default_cont: [NodeId; SLOTS],
    default_cat: [NodeId; SLOTS],
}

impl<'a> ColumnAssembler<'a> {
    fn new(tree: &'a mut TableTree, pool: &'a mut NodePool, header: CellId) -> Self {
        let span = tree.cell(header).span;
        let table_index = tree.cell(header).table_index;
        let arm_name = format!("Col{}Table{table_index}", span.col);

        let base = pool.new_composite(
            header,
            Vec::new(),
            Identity::Named {
                name: format!("{arm_name}StudyArm"),
                namespace: vocab::INDIVIDUALS_NS.to_string(),
            },
        );
        pool.resolve(
            base,
            NamedRef::new(vocab::RDF_TYPE),
            Term::Named(NamedRef::new(vocab::OWL_CLASS)),
        );
        pool.resolve(
            base,
            NamedRef::new(vocab::RDFS_SUBCLASS_OF),
            Term::Named(NamedRef::new(vocab::STUDY_SUBJECT)),
        );
        let label_tokens = tree.cell(header).token_texts();
        let label_text = tree.cell(header).text.clone();
        let label = pool.new_literal(header, label_tokens, LiteralValue::Text(label_text));
        pool.resolve(base, NamedRef::new(vocab::RDFS_LABEL), Term::Node(label));
        pool.push_pending(
            base,
            NamedRef::new(vocab::HAS_ATTRIBUTE),
            Constraint::Supertype(SupertypeConstraint::new(vocab::POPULATION_SIZE)),
        );

        let default_cont = [
            default_template(pool, header, vocab::MEAN),
            default_template(pool, header, vocab::STANDARD_DEVIATION),
        ];
        let default_cat = [
            default_template(pool, header, vocab::POPULATION_SIZE),
            default_template(pool, header, vocab::PERCENTAGE),
        ];

        Self {
            tree,
            pool,
            base,
            arm_name,
            age_found: false,
            use_open_paren: true,
            default_cont,
            default_cat,
        }
    }

    fn run(mut self, header: CellId) -> Vec<NodeId> {
        let defaults = self.default_cont.to_vec();
        let all_features = self.rec(header, defaults);

        let characteristic = SupertypeConstraint::new(vocab::SUBJECT_CHARACTERISTIC);
        let mut leftovers = Vec::new();
        for feature in all_features {
            if self.pool.state(feature) == FeatureState::Value {
                if self.pool.is_supertype_of(&characteristic, feature) {
                    self.pool.push_pending(
                        self.base,
                        NamedRef::new(vocab::HAS_ATTRIBUTE),
                        Constraint::Supertype(characteristic.clone()),
                    );
                    let index = self.pool.pending_count(self.base) - 1;
                    self.pool.try_fill(self.base, feature, index);
                } else {
                    let mut index = 0;
                    while index < self.pool.pending_count(self.base) {
                        self.pool.try_fill(self.base, feature, index);
                        index += 1;
                    }
                }
            }
            if !self.pool.node(feature).subsumed {
                leftovers.push(feature);
            }
        }

        let mut column = vec![self.base];
        column.extend(leftovers);
        column
    }

    /// One row of the column, then its nested rows. `attributes` is the
    /// inherited template vector; the return value is this subtree's
    /// top-level (unsubsumed) features.
    #[allow(clippy::too_many_lines)]
    fn rec(&mut self, data_cell: CellId, mut attributes: Vec<NodeId>) -> Vec<NodeId> {
        let row = self.tree.cell(data_cell).row;
        let header_cell = self
            .tree
            .row(row)
            .fields
            .first()
            .copied()
            .unwrap_or(data_cell);

        let cont_supertypes = [
            SupertypeConstraint::new(vocab::CENTRAL_TENDENCY_MEASURE),
            SupertypeConstraint::new(vocab::DISPERSION_MEASURE),
        ];
        let cat_supertypes = [
            SupertypeConstraint::new(vocab::POPULATION_SIZE),
            SupertypeConstraint::new(vocab::PERCENTAGE),
        ];

        // measure features in the row header override the inherited
        // templates, last match per slot
        let header_tokens = self.tree.cell(header_cell).tokens.clone();
        let mut new_cat_attr: Vec<NodeId> = Vec::new();
        for token in &header_tokens {
            for &feature in &token.features {
                for (slot, supertype) in cont_supertypes.iter().enumerate() {
                    if self.pool.is_supertype_of(supertype, feature) {
                        attributes[slot] = feature;
                    }
                }
                for (slot, supertype) in cat_supertypes.iter().enumerate() {
                    if self.pool.is_supertype_of(supertype, feature) {
                        let learned = if slot == 1 {
                            // a scanned percentage may already carry a value
                            // from its own cell; use a clean node instead
                            let clean = self.pool.new_composite(
                                header_cell,
                                vec![token.text.clone()],
                                Identity::Anonymous,
                            );
                            self.pool.resolve(
                                clean,
                                NamedRef::new(vocab::RDF_TYPE),
                                Term::Named(NamedRef::new(vocab::PERCENTAGE)),
                            );
                            self.pool.push_pending(
                                clean,
                                NamedRef::new(vocab::HAS_VALUE),
                                Constraint::Literal,
                            );
                            clean
                        } else {
                            feature
                        };
                        new_cat_attr.push(learned);
                    }
                }
            }
        }

        let data_text = self.tree.cell(data_cell).text.clone();

        // the first "age" row calibrates the bare-parenthetical heuristic
        // for the rest of the column
        if !self.age_found
            && self
                .tree
                .cell(header_cell)
                .text
                .to_lowercase()
                .contains("age")
        {
            self.age_found = true;
            if data_text.contains('(') && !data_text.contains('±') {
                let mut has_learned_cont = false;
                for &attribute in &attributes {
                    for supertype in &cont_supertypes {
                        if self.pool.is_supertype_of(supertype, attribute)
                            && !self.is_default(attribute)
                        {
                            has_learned_cont = true;
                            break;
                        }
                    }
                }
                if !has_learned_cont {
                    self.use_open_paren = false;
                }
            }
        }

        // categorical or continuous?
        let mut att_orig: Option<Vec<NodeId>> = None;
        let mut cat_att: [Option<NodeId>; SLOTS] = [None, None];
        let mut def_cont_att: [Option<NodeId>; SLOTS] = [None, None];
        for &attribute in &attributes {
            for (slot, supertype) in cat_supertypes.iter().enumerate() {
                if self.pool.is_supertype_of(supertype, attribute) {
                    cat_att[slot] = Some(attribute);
                }
            }
            for (slot, supertype) in cont_supertypes.iter().enumerate() {
                if self.pool.is_supertype_of(supertype, attribute) && self.is_default(attribute) {
                    def_cont_att[slot] = Some(attribute);
                }
            }
        }
        for &attribute in &new_cat_attr {
            for (slot, supertype) in cat_supertypes.iter().enumerate() {
                if self.pool.is_supertype_of(supertype, attribute) {
                    cat_att[slot] = Some(attribute);
                }
            }
        }

        let data_tokens = self.tree.cell(data_cell).tokens.clone();
        let plus_or_minus = data_tokens.iter().any(|t| t.text.contains('±'));
        let percent_symbol = data_tokens.iter().any(|t| t.text.contains('%'));

        // bare "x (y)" data under default continuous templates reads as
        // population plus percentage, unless the age row said otherwise
        if cat_att[0].is_none()
            && cat_att[1].is_none()
            && def_cont_att[0].is_some()
            && def_cont_att[1].is_some()
            && !plus_or_minus
            && self.use_open_paren
            && data_tokens.iter().any(|t| t.text.contains('('))
        {
            att_orig = Some(attributes.clone());
            cat_att[0] = Some(self.default_cat[0]);
            cat_att[1] = Some(self.default_cat[1]);
        }

        let mut is_cat_char = false;
        if let Some(population) = cat_att[0] {
            is_cat_char = true;
            attributes[0] = population;
            attributes[1] = cat_att[1].unwrap_or(self.default_cat[1]);
        } else if let Some(percentage) = cat_att[1] {
            if def_cont_att[0].is_some() && !plus_or_minus {
                is_cat_char = true;
                attributes[0] = self.default_cat[0];
                attributes[1] = percentage;
            }
            // otherwise the % is a unit of a continuous measure; leave the
            // templates alone
        } else if percent_symbol {
            att_orig = Some(attributes.clone());
            attributes[0] = self.default_cat[0];
            is_cat_char = true;
        }

        // header tokens that are neither numbers nor measures label the
        // row's characteristic
        let statistical = SupertypeConstraint::new(vocab::STATISTICAL_MEASURE);
        let mut good_tokens: Vec<String> = Vec::new();
        for token in &header_tokens {
            if token.text.is_empty() || !token.text.chars().all(char::is_alphanumeric) {
                continue;
            }
            let bad = token.features.iter().any(|&feature| {
                matches!(self.pool.node(feature).payload, Payload::Literal(_))
                    || self.pool.is_supertype_of(&statistical, feature)
            });
            if !bad {
                good_tokens.push(token.text.clone());
            }
        }

        let char_node = if good_tokens.is_empty() {
            None
        } else if is_cat_char {
            Some(self.categorical_characteristic(data_cell, header_cell, &good_tokens))
        } else {
            Some(self.continuous_characteristic(data_cell, header_cell, &good_tokens))
        };

        // duplicate the (possibly overridden) templates onto this data cell
        let att_orig = att_orig.unwrap_or_else(|| attributes.clone());
        for attribute in &mut attributes {
            *attribute = self.pool.duplicate(*attribute, data_cell);
        }

        let mut att_to_return: Vec<NodeId> = Vec::new();

        // Count fillable value features against fillable template slots; if
        // slots outnumber fillers, learned templates go first and defaults
        // sit out, unless every template is a default.
        let mut num_to_fill = 0usize;
        let mut will_be_subsumed: Vec<NodeId> = Vec::new();
        for &attribute in &attributes {
            for token in &data_tokens {
                for &feature in &token.features {
                    if self.pool.state(feature) == FeatureState::Value
                        && !will_be_subsumed.contains(&feature)
                    {
                        let pending = self.pool.pending_count(attribute);
                        for index in 0..pending {
                            if self.pool.can_fill(attribute, feature, index) {
                                num_to_fill += 1;
                                will_be_subsumed.push(feature);
                                break;
                            }
                        }
                    }
                }
            }
        }
        let mut fillable_slots: Vec<(NodeId, usize)> = Vec::new();
        for &attribute in &attributes {
            let pending = self.pool.pending_count(attribute);
            for index in 0..pending {
                for &feature in &will_be_subsumed {
                    if !fillable_slots.contains(&(attribute, index))
                        && self.pool.can_fill(attribute, feature, index)
                    {
                        fillable_slots.push((attribute, index));
                    }
                }
            }
        }
        let mut fill_defaults = true;
        if num_to_fill < fillable_slots.len()
            && num_to_fill > 0
            && attributes.iter().any(|&a| !self.is_default(a))
        {
            fill_defaults = false;
        }

        for &attribute in &attributes {
            if !fill_defaults && self.is_default(attribute) {
                continue;
            }
            let token_count = self.tree.cell(data_cell).tokens.len();
            for token_index in 0..token_count {
                let features = self.tree.cell(data_cell).tokens[token_index].features.clone();
                for feature in features {
                    if self.pool.state(feature) != FeatureState::Value
                        || self.pool.node(feature).subsumed
                    {
                        continue;
                    }
                    let pending = self.pool.pending_count(attribute);
                    for index in 0..pending {
                        if self.pool.try_fill(attribute, feature, index) {
                            self.tree.cell_mut(data_cell).tokens[token_index]
                                .features
                                .push(attribute);
                            att_to_return.push(attribute);
                            break;
                        }
                    }
                }
            }
            // the arm anchor itself may satisfy a remaining slot
            let mut index = 0;
            while index < self.pool.pending_count(attribute) {
                self.pool.try_fill(attribute, self.base, index);
                index += 1;
            }
        }

        // assemble the characteristic from whatever the templates captured
        if let Some(node) = char_node {
            for feature in att_to_return.clone() {
                if self.pool.state(feature) == FeatureState::Value
                    && !self.pool.node(feature).subsumed
                {
                    let pending = self.pool.pending_count(node);
                    for index in 0..pending {
                        if self.pool.try_fill(node, feature, index) {
                            self.mark_matching_tokens(feature, node);
                            break;
                        }
                    }
                }
            }
            att_to_return = vec![node];
        }

        // children: their top-level nodes either complete this row's
        // characteristic or float upward untouched
        let children = self.tree.cell(data_cell).col_children.clone();
        for child in children {
            let child_features = self.rec(child, att_orig.clone());
            match char_node {
                Some(node) => {
                    for feature in child_features {
                        let mut filled_adult = false;
                        if self.pool.state(feature) == FeatureState::Value
                            && !self.pool.node(feature).subsumed
                        {
                            let pending = self.pool.pending_count(node);
                            for index in 0..pending {
                                if self.pool.try_fill(node, feature, index) {
                                    filled_adult = true;
                                    self.mark_matching_tokens(feature, node);
                                    break;
                                }
                            }
                            if self.pool.composite(feature).is_some() {
                                self.merge_label(feature, &good_tokens, header_cell);
                            }
                        }
                        if !filled_adult {
                            att_to_return.push(feature);
                        }
                    }
                }
                None => att_to_return.extend(child_features),
            }
        }

        // safety net: a token whose single feature nothing picked up still
        // surfaces, so values are never silently dropped
        let token_count = self.tree.cell(data_cell).tokens.len();
        for token_index in 0..token_count {
            let features = self.tree.cell(data_cell).tokens[token_index].features.clone();
            if features.len() == 1
                && !att_to_return.contains(&features[0])
                && !self.pool.node(features[0]).subsumed
            {
                att_to_return.push(features[0]);
            }
        }

        att_to_return
    }

    fn categorical_characteristic(
        &mut self,
        data_cell: CellId,
        header_cell: CellId,
        good_tokens: &[String],
    ) -> NodeId {
        let row_index = self.tree.cell(data_cell).span.row;
        let node = self.pool.new_composite(
            data_cell,
            good_tokens.to_vec(),
            Identity::Named {
                name: format!("Row{row_index}{}StudySubject", self.arm_name),
                namespace: vocab::INDIVIDUALS_NS.to_string(),
            },
        );
        self.pool.resolve(
            node,
            NamedRef::new(vocab::RDF_TYPE),
            Term::Named(NamedRef::new(vocab::OWL_CLASS)),
        );
        self.pool.resolve(
            node,
            NamedRef::new(vocab::RDFS_SUBCLASS_OF),
            Term::Node(self.base),
        );
        self.pool.push_pending(
            node,
            NamedRef::new(vocab::HAS_ATTRIBUTE),
            Constraint::Supertype(SupertypeConstraint::new(vocab::POPULATION_SIZE)),
        );
        self.pool.push_pending(
            node,
            NamedRef::new(vocab::HAS_ATTRIBUTE),
            Constraint::Supertype(SupertypeConstraint::new(vocab::PERCENTAGE)),
        );
        self.attach_label(node, header_cell, good_tokens);
        node
    }

    fn continuous_characteristic(
        &mut self,
        data_cell: CellId,
        header_cell: CellId,
        good_tokens: &[String],
    ) -> NodeId {
        let node = self
            .pool
            .new_composite(data_cell, good_tokens.to_vec(), Identity::Anonymous);

        match self.tree.cell(header_cell).top_concept.clone() {
            Some(concept) => {
                self.pool
                    .resolve(node, NamedRef::new(vocab::RDF_TYPE), Term::Named(concept));
            }
            None => {
                self.pool.push_pending(
                    node,
                    NamedRef::new(vocab::RDF_TYPE),
                    Constraint::Supertype(
                        SupertypeConstraint::new(vocab::SUBJECT_CHARACTERISTIC).named_only(),
                    ),
                );
            }
        }
        self.pool.push_pending(
            node,
            NamedRef::new(vocab::HAS_UNIT),
            Constraint::Supertype(SupertypeConstraint::new(vocab::UNIT_OF_MEASUREMENT)),
        );
        self.pool.push_pending(
            node,
            NamedRef::new(vocab::HAS_ATTRIBUTE),
            Constraint::Supertype(SupertypeConstraint::new(vocab::CENTRAL_TENDENCY_MEASURE)),
        );
        self.pool.push_pending(
            node,
            NamedRef::new(vocab::HAS_ATTRIBUTE),
            Constraint::Supertype(SupertypeConstraint::new(vocab::DISPERSION_MEASURE)),
        );
        self.attach_label(node, header_cell, good_tokens);
        node
    }

    fn attach_label(&mut self, node: NodeId, header_cell: CellId, good_tokens: &[String]) {
        let label = self.pool.new_literal(
            header_cell,
            good_tokens.to_vec(),
            LiteralValue::Text(good_tokens.join(" ")),
        );
        self.pool
            .resolve(node, NamedRef::new(vocab::RDFS_LABEL), Term::Node(label));
    }

    /// Extend an existing label rather than overwrite it; the merged feature
    /// keeps every row name that contributed to it.
    fn merge_label(&mut self, feature: NodeId, good_tokens: &[String], header_cell: CellId) {
        let addition = good_tokens.join(" ");
        let existing = self.pool.composite(feature).and_then(|c| {
            c.resolved
                .iter()
                .find(|r| r.predicate.id == vocab::RDFS_LABEL)
                .map(|r| r.object.clone())
        });

        match existing {
            Some(Term::Node(label)) => {
                if let Payload::Literal(LiteralValue::Text(text)) =
                    &mut self.pool.node_mut(label).payload
                {
                    *text = format!("{text}, {addition}");
                }
                self.pool
                    .node_mut(label)
                    .matching
                    .extend(good_tokens.iter().cloned());
            }
            Some(_) => {}
            None => self.attach_label(feature, header_cell, good_tokens),
        }
    }

    /// After a feature fills a slot, the tokens it matched are annotated
    /// with the subsuming node for provenance.
    fn mark_matching_tokens(&mut self, feature: NodeId, node: NodeId) {
        let cell = self.pool.node(feature).cell;
        let matching = self.pool.node(feature).matching.clone();
        for token in &mut self.tree.cell_mut(cell).tokens {
            if matching.iter().any(|m| m == &token.text) {
                token.features.push(node);
            }
        }
    }

    fn is_default(&self, node: NodeId) -> bool {
        self.pool
            .node(node)
            .matching
            .iter()
            .any(|m| m == DEFAULT_MARKER)
    }
}

fn default_template(pool: &mut NodePool, cell: CellId, ty: &str) -> NodeId {
    let id = pool.new_composite(cell, vec![DEFAULT_MARKER.to_string()], Identity::Anonymous);
    pool.resolve(
        id,
        NamedRef::new(vocab::RDF_TYPE),
        Term::Named(NamedRef::new(ty)),
    );
    pool.push_pending(id, NamedRef::new(vocab::HAS_VALUE), Constraint::Literal);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::Annotator;
    use crate::extraction::{BoundingBox, SourceCell, SourceTable};

    async fn interpret(rows: Vec<Vec<&str>>) -> (TableTree, NodePool, Vec<NodeId>) {
        let source = SourceTable {
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(r, row)| {
                    row.into_iter()
                        .enumerate()
                        .map(|(c, text)| {
                            let indent = if text.starts_with("  ") { 20.0 } else { 10.0 };
                            let mut cell =
                                SourceCell::new(text.trim_start().to_string()).with_span(r, c);
                            if c == 0 {
                                cell = cell.with_bbox(BoundingBox::new(
                                    indent,
                                    r as f64 * 10.0,
                                    indent + 50.0,
                                    r as f64 * 10.0 + 8.0,
                                ));
                            }
                            cell
                        })
                        .collect()
                })
                .collect(),
            font_runs: Vec::new(),
        };
        let mut tree = TableTree::reconstruct(0, &source).unwrap();
        let mut pool = NodePool::new();
        Annotator::new()
            .annotate_tree(&mut tree, &mut pool)
            .await
            .unwrap();
        let header = tree.row(tree.root).fields[1];
        let nodes = interpret_column(&mut tree, &mut pool, header);
        (tree, pool, nodes)
    }

    fn attribute_of(pool: &NodePool, node: NodeId, ty: &str) -> Option<NodeId> {
        let composite = pool.composite(node)?;
        composite
            .resolved
            .iter()
            .filter(|r| r.predicate.id == vocab::HAS_ATTRIBUTE)
            .find_map(|r| match r.object {
                Term::Node(id) => {
                    (pool.declared_type(id)?.id == ty).then_some(id)
                }
                _ => None,
            })
    }

    fn value_of(pool: &NodePool, node: NodeId) -> Option<f64> {
        let composite = pool.composite(node)?;
        composite
            .resolved
            .iter()
            .find(|r| r.predicate.id == vocab::HAS_VALUE)
            .and_then(|r| match &r.object {
                Term::Node(id) => match &pool.node(*id).payload {
                    Payload::Literal(LiteralValue::Number(n)) => Some(*n),
                    _ => None,
                },
                Term::Literal(LiteralValue::Number(n)) => Some(*n),
                _ => None,
            })
    }

    fn label_of(pool: &NodePool, node: NodeId) -> Option<String> {
        let composite = pool.composite(node)?;
        composite
            .resolved
            .iter()
            .find(|r| r.predicate.id == vocab::RDFS_LABEL)
            .and_then(|r| match &r.object {
                Term::Node(id) => match &pool.node(*id).payload {
                    Payload::Literal(LiteralValue::Text(t)) => Some(t.clone()),
                    _ => None,
                },
                _ => None,
            })
    }

    #[tokio::test]
    async fn arm_node_anchors_the_column() {
        let (_, pool, nodes) = interpret(vec![vec!["", "Control"]]).await;
        let base = nodes[0];

        match &pool.composite(base).unwrap().identity {
            Identity::Named { name, .. } => assert_eq!(name, "Col1Table0StudyArm"),
            Identity::Anonymous => panic!("arm node must be named"),
        }
        assert_eq!(label_of(&pool, base), Some("Control".to_string()));
    }

    #[tokio::test]
    async fn learned_measures_fill_a_continuous_characteristic() {
        let (_, pool, nodes) = interpret(vec![
            vec!["", "Control"],
            vec!["Age (years)", ""],
            vec!["  Mean (SD)", "42.3 (5.1)"],
        ])
        .await;
        let base = nodes[0];

        let characteristic = pool
            .composite(base)
            .unwrap()
            .resolved
            .iter()
            .filter(|r| r.predicate.id == vocab::HAS_ATTRIBUTE)
            .find_map(|r| match r.object {
                Term::Node(id) => Some(id),
                _ => None,
            })
            .expect("characteristic attached to the arm");

        assert_eq!(label_of(&pool, characteristic), Some("Age years".into()));

        let mean = attribute_of(&pool, characteristic, vocab::MEAN).unwrap();
        assert_eq!(value_of(&pool, mean), Some(42.3));
        let sd = attribute_of(&pool, characteristic, vocab::STANDARD_DEVIATION).unwrap();
        assert_eq!(value_of(&pool, sd), Some(5.1));
    }

    #[tokio::test]
    async fn percent_data_cell_yields_a_categorical_characteristic() {
        let (_, pool, nodes) = interpret(vec![
            vec!["", "Control"],
            vec!["Female", "30 (60%)"],
        ])
        .await;

        let categorical = nodes
            .iter()
            .find_map(|&n| {
                pool.composite(n).and_then(|c| match &c.identity {
                    Identity::Named { name, .. } if name.contains("StudySubject") => Some(n),
                    _ => None,
                })
            })
            .expect("categorical characteristic emitted");

        let population = attribute_of(&pool, categorical, vocab::POPULATION_SIZE).unwrap();
        assert_eq!(value_of(&pool, population), Some(30.0));

        // the scanned percentage captured its value even though it stays a
        // top-level node
        let percentage = (0..pool.len())
            .map(NodeId)
            .find(|&id| {
                pool.declared_type(id).is_some_and(|t| t.id == vocab::PERCENTAGE)
                    && value_of(&pool, id) == Some(60.0)
            });
        assert!(percentage.is_some());
    }

    #[tokio::test]
    async fn not_applicable_data_contributes_no_values() {
        let (tree, pool, nodes) = interpret(vec![
            vec!["", "Control"],
            vec!["BMI", "N/A"],
        ])
        .await;

        let data_cell = tree.row(tree.root).fields[1];
        let row_cell = tree.cell(data_cell).col_children[0];
        for token in &tree.cell(row_cell).tokens {
            for &feature in &token.features {
                assert!(!matches!(pool.node(feature).payload, Payload::Literal(_)));
            }
        }

        for &node in &nodes {
            if let Some(composite) = pool.composite(node) {
                for relation in &composite.resolved {
                    if relation.predicate.id == vocab::HAS_VALUE {
                        panic!("no value should have been captured");
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn age_row_with_parenthetical_mean_stays_continuous() {
        let (_, pool, nodes) = interpret(vec![
            vec!["", "Control"],
            vec!["Age (years)", "42.3 (5.1)"],
        ])
        .await;
        let base = nodes[0];

        let characteristic = pool
            .composite(base)
            .unwrap()
            .resolved
            .iter()
            .filter(|r| r.predicate.id == vocab::HAS_ATTRIBUTE)
            .find_map(|r| match r.object {
                Term::Node(id) => Some(id),
                _ => None,
            })
            .expect("age characteristic attached");

        // defaults stay in play: mean and standard deviation, not
        // population and percentage
        assert!(attribute_of(&pool, characteristic, vocab::MEAN).is_some());
        assert!(attribute_of(&pool, characteristic, vocab::STANDARD_DEVIATION).is_some());
        assert!(attribute_of(&pool, characteristic, vocab::POPULATION_SIZE).is_none());
    }

    #[tokio::test]
    async fn bare_parenthetical_after_age_reads_as_population_and_percent() {
        let (_, pool, nodes) = interpret(vec![
            vec!["", "Control"],
            vec!["Male", "12 (40)"],
        ])
        .await;

        let categorical = nodes
            .iter()
            .find_map(|&n| {
                pool.composite(n).and_then(|c| match &c.identity {
                    Identity::Named { name, .. } if name.contains("StudySubject") => Some(n),
                    _ => None,
                })
            })
            .expect("bare parenthetical row becomes categorical");

        let population = attribute_of(&pool, categorical, vocab::POPULATION_SIZE).unwrap();
        assert_eq!(value_of(&pool, population), Some(12.0));
        let percentage = attribute_of(&pool, categorical, vocab::PERCENTAGE).unwrap();
        assert_eq!(value_of(&pool, percentage), Some(40.0));
    }

    #[tokio::test]
    async fn learned_template_outranks_default_when_fillers_are_scarce() {
        let (_, pool, nodes) = interpret(vec![
            vec!["", "Control"],
            vec!["Height, Median", "171.0"],
        ])
        .await;
        let base = nodes[0];

        let characteristic = pool
            .composite(base)
            .unwrap()
            .resolved
            .iter()
            .filter(|r| r.predicate.id == vocab::HAS_ATTRIBUTE)
            .find_map(|r| match r.object {
                Term::Node(id) => Some(id),
                _ => None,
            })
            .expect("height characteristic attached");

        let median = attribute_of(&pool, characteristic, vocab::MEDIAN).unwrap();
        assert_eq!(value_of(&pool, median), Some(171.0));
        assert!(attribute_of(&pool, characteristic, vocab::STANDARD_DEVIATION).is_none());
    }
}

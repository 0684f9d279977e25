//! Sample essay an instructor can load to try the tool without their own text.

/// "The Impact of K-Culture": an intermediate learner's essay with typical
/// capitalization, run-on and word-choice issues left in on purpose.
pub const EXAMPLE_ESSAY: &str = r#"The Impact of K-Culture

  Korean culture, called K-culture, now has a big impact on many foreign countries. One example is the most famous K-pop. With BTS's entry into the Billboard charts, many other Korean singers have come to the attention of the world, thereby expanding Korea's presence. 
  Also, Korean dramas called K-dramas had a great influence overseas. With the easy access to Korean dramas through platforms such as Netflix and YouTube, The consumption of Korean dramas has increased worldwide. 
  In another example, Korean cosmetics and skin care products called K-beauty are gaining popularity in the global market, affecting many consumers. As Korean cosmetics have gained attention for their good ingredients and innovative technology, filming Korean makeup videos with Korean makeup methods and cosmetics has become popular among the younger generation, Korean beauty brands have gradually become more competitive in the global market and can find Korean cosmetics in many countries. 
  This K-culture has a great influence worldwide in various fields.  This phenomenon is playing an important role in promoting understanding and interest in Korea in the global society beyond simple cultural consumption.
  It is expected that the influence of K-culture will continue in the future, which will further promote exchanges between cultures. However, the more such k-culture affects overseas, the more problems such as cultural identification and commercialization of consumerism may arise. Therefore, it is necessary to recognize the disadvantages that may occur in the process. It is important to respect cultural diversity and to create a healthy consumption culture."#;
